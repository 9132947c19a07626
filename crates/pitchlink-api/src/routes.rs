use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};

use crate::auth::{self, AppState};
use crate::files::MAX_FILE_SIZE;
use crate::middleware::require_auth;
use crate::{investor_profiles, matching, startup_profiles};

/// Multipart framing on top of the largest accepted file.
const BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(auth::root))
        .route("/health", get(auth::health))
        .route("/auth/send-otp", post(auth::send_otp))
        .route("/auth/verify-otp-and-signup", post(auth::verify_otp_and_signup))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        // Startup profiles
        .route("/startup-profile", post(startup_profiles::create_handler))
        .route("/startup-profile/", post(startup_profiles::create_handler))
        .route("/startup-profile/create-with-files", post(startup_profiles::create_with_files))
        .route("/startup-profile/all", get(startup_profiles::list_handler))
        .route(
            "/startup-profile/{user_id}",
            get(startup_profiles::get_handler).put(startup_profiles::update_handler),
        )
        .route("/startup-profile/user/{user_id}", get(startup_profiles::get_own_handler))
        .route("/startup-profile/upload-pitch-deck", post(startup_profiles::upload_pitch_deck))
        .route("/startup-profile/update-pitch-deck", put(startup_profiles::upload_pitch_deck))
        .route(
            "/startup-profile/download-pitch-deck/{user_id}",
            get(startup_profiles::download_pitch_deck),
        )
        // Investor profiles
        .route("/investor-profile", post(investor_profiles::create_handler))
        .route("/investor-profile/", post(investor_profiles::create_handler))
        .route("/investor-profile/all", get(investor_profiles::list_handler))
        .route(
            "/investor-profile/{user_id}",
            get(investor_profiles::get_handler).put(investor_profiles::update_handler),
        )
        .route("/investor-profile/user/{user_id}", get(investor_profiles::get_own_handler))
        .route("/investor-profile/upload-photo", post(investor_profiles::upload_photo))
        .route("/investor-profile/download-photo/{user_id}", get(investor_profiles::download_photo))
        // Matching
        .route("/applications/send-pitch-deck", post(matching::send_pitch_deck_handler))
        .route(
            "/applications/startup/{startup_id}/sent-pitch-decks",
            get(matching::sent_pitch_decks),
        )
        .route(
            "/applications/investor/{investor_id}/received-pitch-decks",
            get(matching::received_pitch_decks),
        )
        .route("/applications/update-interest", post(matching::update_interest_handler))
        .route(
            "/applications/interest-status/investor/{investor_id}",
            get(matching::investor_interest),
        )
        .route(
            "/applications/interest-status/startup/{startup_id}",
            get(matching::startup_interest),
        )
        .route(
            "/applications/download-pitch-deck/{application_id}",
            get(matching::download_pitch_deck),
        )
        .route("/applications/{application_id}/logs", get(matching::logs_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
