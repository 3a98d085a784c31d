use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes(upload_limit: usize) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/candidates", candidate_routes())
        .nest("/design-review", review_routes(upload_limit))
        .nest("/question", question_routes())
}

fn candidate_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::candidate::create_candidate,
            handlers::candidate::list_candidates
        ))
        .routes(routes!(
            handlers::candidate::get_candidate,
            handlers::candidate::delete_candidate
        ))
}

fn review_routes(upload_limit: usize) -> OpenApiRouter<AppState> {
    let intake = OpenApiRouter::new()
        .routes(routes!(handlers::review::submit_design_review))
        .layer(handlers::review::intake_body_limit(upload_limit));

    let review = OpenApiRouter::new()
        .routes(routes!(
            handlers::review::get_design_review,
            handlers::review::delete_design_review
        ))
        .routes(routes!(handlers::question::list_questions))
        .routes(routes!(handlers::question::answer_questions))
        .routes(routes!(handlers::evaluation::trigger_evaluation))
        .routes(routes!(handlers::evaluation::retry_review))
        .routes(routes!(handlers::evaluation::get_evaluation));

    intake.merge(review)
}

fn question_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::question::answer_question))
}
