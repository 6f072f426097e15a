//! REST API layer: route handlers, DTOs, the actor extractor, and router
//! composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root. With the `swagger-ui` feature the OpenAPI document is served at
//! `/api-docs/openapi.json` and browsable at `/swagger-ui`.

pub mod actor;
pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "club-ledger",
        description = "Member reputation ledger, role hierarchy, and leaderboard."
    ),
    paths(
        handlers::system::health_handler,
        handlers::members::create_member,
        handlers::members::list_members,
        handlers::members::get_member,
        handlers::members::update_member,
        handlers::members::delete_member,
        handlers::members::me,
        handlers::roles::get_role,
        handlers::roles::set_role,
        handlers::points::apply_points,
        handlers::points::list_activities,
        handlers::points::verify_ledger,
        handlers::reviews::submit_review,
        handlers::reviews::list_reviews,
        handlers::leaderboard::leaderboard,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::domain::Member,
        crate::domain::MemberWithRole,
        crate::domain::Role,
        crate::domain::ActivityRecord,
        crate::domain::ActivityView,
        crate::domain::LeaderboardEntry,
        crate::domain::LeaderboardScope,
        crate::domain::Review,
        crate::domain::ReviewView,
        crate::domain::ReviewSummary,
        crate::domain::LandingView,
        crate::service::LedgerReconciliation,
    )),
    tags(
        (name = "Members", description = "Onboarding, profiles, and removal"),
        (name = "Roles", description = "Role hierarchy"),
        (name = "Points", description = "Points ledger"),
        (name = "Reviews", description = "Peer reviews"),
        (name = "Leaderboard", description = "Rankings"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::ClubConfig;
    use crate::domain::{
        ActivityRecord, Member, MemberId, MemberWithRole, PointChange, ProfileUpdate, Review,
        Role, RoleAssignment,
    };
    use crate::error::ClubError;
    use crate::store::{ClubStore, MemoryStore};

    fn app() -> Router {
        app_over(Arc::new(MemoryStore::new()))
    }

    fn app_over(store: Arc<dyn ClubStore>) -> Router {
        let state = AppState::new(store, &ClubConfig::default());
        build_router().with_state(state)
    }

    /// Removes the target of every point change right after it commits.
    #[derive(Debug, Default)]
    struct RemoveAfterCommit {
        inner: MemoryStore,
    }

    #[async_trait]
    impl ClubStore for RemoveAfterCommit {
        fn backend(&self) -> &'static str {
            self.inner.backend()
        }

        async fn insert_member(&self, member: Member) -> Result<Member, ClubError> {
            self.inner.insert_member(member).await
        }

        async fn member(&self, id: MemberId) -> Result<Option<Member>, ClubError> {
            self.inner.member(id).await
        }

        async fn member_by_email(&self, email: &str) -> Result<Option<Member>, ClubError> {
            self.inner.member_by_email(email).await
        }

        async fn members(&self, ids: &[MemberId]) -> Result<Vec<Member>, ClubError> {
            self.inner.members(ids).await
        }

        async fn list_members(&self) -> Result<Vec<MemberWithRole>, ClubError> {
            self.inner.list_members().await
        }

        async fn update_profile(
            &self,
            id: MemberId,
            update: &ProfileUpdate,
        ) -> Result<Member, ClubError> {
            self.inner.update_profile(id, update).await
        }

        async fn delete_member(&self, id: MemberId, expected_role: Role) -> Result<(), ClubError> {
            self.inner.delete_member(id, expected_role).await
        }

        async fn role_assignment(
            &self,
            id: MemberId,
        ) -> Result<Option<RoleAssignment>, ClubError> {
            self.inner.role_assignment(id).await
        }

        async fn put_role(
            &self,
            assignment: RoleAssignment,
            expected_role: Option<Role>,
        ) -> Result<(), ClubError> {
            self.inner.put_role(assignment, expected_role).await
        }

        async fn apply_point_change(
            &self,
            change: PointChange,
        ) -> Result<(Member, ActivityRecord), ClubError> {
            let target = change.target_id;
            let committed = self.inner.apply_point_change(change).await?;
            self.inner.delete_member(target, Role::Member).await?;
            Ok(committed)
        }

        async fn activities_for(
            &self,
            target: MemberId,
        ) -> Result<Vec<ActivityRecord>, ClubError> {
            self.inner.activities_for(target).await
        }

        async fn insert_review(&self, review: Review) -> Result<Review, ClubError> {
            self.inner.insert_review(review).await
        }

        async fn reviews_for(&self, target: MemberId) -> Result<Vec<Review>, ClubError> {
            self.inner.reviews_for(target).await
        }
    }

    fn get(uri: &str, actor: &str) -> Request<Body> {
        let Ok(request) = Request::get(uri)
            .header(actor::ACTOR_HEADER, actor)
            .body(Body::empty())
        else {
            panic!("request builds");
        };
        request
    }

    async fn join(app: &Router, email: &str) -> String {
        let Ok(request) = Request::post("/api/v1/members")
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"email":"{email}"}}"#)))
        else {
            panic!("request builds");
        };
        let (status, member) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = member["id"].as_str() else {
            panic!("member id missing");
        };
        id.to_string()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let Ok(response) = app.clone().oneshot(request).await else {
            panic!("router failed");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body failed");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let Ok(request) = Request::get("/health").body(Body::empty()) else {
            panic!("request builds");
        };
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn member_cannot_award_points() {
        let app = app();
        let Ok(request) = Request::post("/api/v1/members")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email":"ada@club.org"}"#))
        else {
            panic!("request builds");
        };
        let (status, member) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = member["id"].as_str() else {
            panic!("member id missing");
        };

        let Ok(request) = Request::post(format!("/api/v1/members/{id}/points"))
            .header("content-type", "application/json")
            .header(actor::ACTOR_HEADER, id)
            .body(Body::from(r#"{"delta":5,"description":"self"}"#))
        else {
            panic!("request builds");
        };
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["reason"], "member_cannot_change_points");
    }

    #[tokio::test]
    async fn strangers_are_rejected_on_every_read_route() {
        let app = app();
        let ada = join(&app, "ada@club.org").await;
        let stranger = MemberId::new().to_string();

        for uri in [
            format!("/api/v1/members/{ada}"),
            format!("/api/v1/members/{ada}/role"),
            format!("/api/v1/members/{ada}/activities"),
            format!("/api/v1/members/{ada}/ledger/verify"),
            format!("/api/v1/members/{ada}/reviews"),
            "/api/v1/members".to_string(),
            "/api/v1/leaderboard".to_string(),
            "/api/v1/me".to_string(),
        ] {
            let (status, body) = send(&app, get(&uri, &stranger)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"]["code"], 4001, "{uri}");
        }

        let (status, _) = send(&app, get(&format!("/api/v1/members/{ada}"), &ada)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn accepted_change_reports_its_own_total() {
        let store = Arc::new(RemoveAfterCommit::default());
        let Ok(owner) = store
            .inner
            .insert_member(Member::new(crate::domain::Identity {
                email: "owner@club.org".to_string(),
                full_name: None,
            }))
            .await
        else {
            panic!("insert failed");
        };
        let Ok(()) = store
            .inner
            .put_role(RoleAssignment::new(owner.id, Role::Owner, None), None)
            .await
        else {
            panic!("seed failed");
        };
        let app = app_over(Arc::clone(&store) as Arc<dyn ClubStore>);
        let ada = join(&app, "ada@club.org").await;

        let Ok(request) = Request::post(format!("/api/v1/members/{ada}/points"))
            .header("content-type", "application/json")
            .header(actor::ACTOR_HEADER, owner.id.to_string())
            .body(Body::from(r#"{"delta":6,"description":"workshop"}"#))
        else {
            panic!("request builds");
        };
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["total_points"], 6);
        assert_eq!(body["activity"]["delta"], 6);

        let Ok(target) = ada.parse::<MemberId>() else {
            panic!("member id parses");
        };
        assert!(matches!(store.inner.member(target).await, Ok(None)));
        let Ok(entries) = store.inner.activities_for(target).await else {
            panic!("read failed");
        };
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn guarded_routes_need_an_actor() {
        let Ok(request) = Request::get("/api/v1/leaderboard").body(Body::empty()) else {
            panic!("request builds");
        };
        let (status, _) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/members",
            "/api/v1/members/{id}",
            "/api/v1/members/{id}/role",
            "/api/v1/members/{id}/points",
            "/api/v1/members/{id}/activities",
            "/api/v1/members/{id}/ledger/verify",
            "/api/v1/members/{id}/reviews",
            "/api/v1/leaderboard",
            "/api/v1/me",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
