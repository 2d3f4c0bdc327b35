//! Comment service
//!
//! Public listing and creation. Creation has no path around [`AbuseGuard`].

use engage_core::text::hash_ip;
use engage_core::{Actor, Comment, Snowflake};
use tracing::{info, instrument};

use crate::dto::{CommentListQuery, CommentResponse, CreateCommentRequest, PaginatedResponse};

use super::abuse::{non_blank, AbuseGuard, ClientInfo, Submitter};
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::rate_limit::RateLimitInfo;

const MAX_USER_AGENT_LEN: usize = 512;

/// A stored comment plus the caller's remaining submission quota
#[derive(Debug, Clone)]
pub struct CreatedComment {
    pub comment: CommentResponse,
    pub quota: RateLimitInfo,
}

pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Published comments of a target, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        target_id: Snowflake,
        query: &CommentListQuery,
    ) -> ServiceResult<PaginatedResponse<CommentResponse>> {
        let config = self.ctx.comment_config();
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(config.page_size)
            .clamp(1, config.max_page_size.max(1));
        let offset = i64::from(page - 1) * i64::from(limit);

        let repo = self.ctx.comment_repo();
        let (comments, total) = tokio::try_join!(
            repo.find_published_by_target(target_id, offset, i64::from(limit)),
            repo.count_published_by_target(target_id),
        )?;

        let data = comments.iter().map(CommentResponse::from).collect();
        Ok(PaginatedResponse::new(data, page, limit, total))
    }

    /// Screen a submission through every abuse gate, then store it
    #[instrument(skip_all, fields(target_id = %target_id, actor = %actor.key()))]
    pub async fn create(
        &self,
        actor: &Actor,
        fresh_actor: bool,
        client: &ClientInfo,
        target_id: Snowflake,
        body: &CreateCommentRequest,
    ) -> ServiceResult<CreatedComment> {
        let submitter = Submitter {
            actor,
            fresh: fresh_actor,
            client,
        };
        let clearance = AbuseGuard::new(self.ctx)
            .screen(submitter, target_id, body)
            .await?;

        // existence is checked last so the gates above never reveal it
        if !self.ctx.target_repo().exists(target_id).await? {
            return Err(ServiceError::not_found("target", target_id));
        }

        let config = self.ctx.comment_config();
        let now = self.ctx.clock().now();
        let comment = Comment {
            id: self.ctx.generate_id(),
            target_id,
            actor: actor.key(),
            author_id: actor.user_id(),
            name: non_blank(body.name.as_deref()).map(str::to_owned),
            email: non_blank(body.email.as_deref()).map(str::to_lowercase),
            text: body.text.trim().to_owned(),
            text_hash: clearance.text_hash,
            ip_hash: client.ip.as_deref().map(|ip| hash_ip(&config.ip_hash_salt, ip)),
            user_agent: client
                .user_agent
                .as_deref()
                .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect()),
            risk_score: clearance.risk_score,
            is_published: config.auto_publish,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.ctx.comment_repo().create(&comment).await?;
        if !self.ctx.target_repo().increment_comment_count(target_id).await? {
            return Err(ServiceError::not_found("target", target_id));
        }

        info!(
            comment_id = %comment.id,
            published = comment.is_published,
            "Comment created"
        );

        Ok(CreatedComment {
            comment: CommentResponse::from(&comment),
            quota: clearance.quota,
        })
    }
}
