//! OTP-gated account creation.
//!
//! Per email: no OTP → OTP issued → consumed (user created) or expired.
//! Issuing replaces any earlier code for the email, and a code is only
//! accepted while `expires_at > now`. Time is passed in so expiry can be
//! exercised without sleeping.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use pitchlink_db::{Database, queries, timestamp};
use pitchlink_types::api::{AuthResponse, LoginRequest, SendOtpResponse, VerifyOtpAndSignupRequest};
use pitchlink_types::models::Role;

use crate::credentials::{self, TokenIssuer};
use crate::error::{ApiError, ApiResult};
use crate::mailer::Mailer;

pub const OTP_TTL_SECONDS: i64 = 120;
pub const MIN_PASSWORD_LEN: usize = 8;

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const BAD_LOGIN: &str = "Invalid email or password";

pub fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(email),
        _ => Err(ApiError::Validation("Invalid email address".into())),
    }
}

/// Issue a fresh code for `email` and try to mail it. Delivery failure
/// leaves the code usable and is reported as a warning.
pub fn request_otp(db: &Database, mailer: &dyn Mailer, email: &str, now: DateTime<Utc>) -> ApiResult<SendOtpResponse> {
    let email = normalize_email(email)?;
    let code = credentials::generate_otp();
    let now_ts = timestamp(now);
    let expires_at = timestamp(now + Duration::seconds(OTP_TTL_SECONDS));

    db.with_tx(|conn| {
        if queries::users::by_email(conn, &email)?.is_some_and(|u| u.is_verified) {
            return Err(ApiError::Conflict(DUPLICATE_EMAIL.into()));
        }
        queries::otps::delete_for_email(conn, &email)?;
        queries::otps::insert(conn, &Uuid::new_v4().to_string(), &email, &code, &expires_at, &now_ts)?;
        Ok(())
    })?;
    info!("OTP issued for {}", email);

    Ok(match mailer.send_otp(&email, &code) {
        Ok(()) => SendOtpResponse {
            message: "OTP sent successfully".into(),
            email,
            warning: None,
        },
        Err(e) => {
            warn!("OTP email to {} failed: {:#}", email, e);
            SendOtpResponse {
                message: "OTP generated successfully".into(),
                email,
                warning: Some("Email delivery may have failed. Please check your email or try again.".into()),
            }
        }
    })
}

/// Consume a valid code and create the account. All writes share one
/// transaction, so a failure anywhere leaves the code unconsumed.
pub fn verify_and_signup(
    db: &Database,
    tokens: &TokenIssuer,
    req: &VerifyOtpAndSignupRequest,
    now: DateTime<Utc>,
) -> ApiResult<AuthResponse> {
    let email = normalize_email(&req.email)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let now_ts = timestamp(now);
    let password_hash = credentials::hash_password(&req.password)?;

    let response = db.with_tx(|conn| {
        let otp = queries::otps::find_valid(conn, &email, req.otp.trim(), &now_ts)?
            .ok_or(ApiError::InvalidOrExpired)?;

        if queries::users::by_email(conn, &email)?.is_some() {
            return Err(ApiError::Conflict(DUPLICATE_EMAIL.into()));
        }

        let user_id = Uuid::new_v4();
        queries::users::insert(conn, &user_id.to_string(), &email, req.role.as_str(), &password_hash, &now_ts)
            .map_err(|e| ApiError::conflict_on_unique(e, DUPLICATE_EMAIL))?;
        queries::otps::delete(conn, &otp.id)?;

        let access_token = tokens.issue(user_id, &email, req.role, now)?;
        Ok(AuthResponse {
            access_token,
            token_type: "bearer".into(),
            user_id,
            role: req.role,
            email: email.clone(),
        })
    })?;

    info!("Created {} account {}", response.role, response.user_id);
    Ok(response)
}

pub fn login(db: &Database, tokens: &TokenIssuer, req: &LoginRequest, now: DateTime<Utc>) -> ApiResult<AuthResponse> {
    let unauthorized = || ApiError::Unauthorized(BAD_LOGIN.into());
    let email = normalize_email(&req.email).map_err(|_| unauthorized())?;

    let user = db
        .with_conn(|conn| queries::users::by_email(conn, &email))?
        .filter(|u| u.is_verified)
        .ok_or_else(unauthorized)?;

    if !credentials::verify_password(&req.password, &user.password)? {
        return Err(unauthorized());
    }

    let user_id: Uuid = user.id.parse().map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;
    let role: Role = user.role.parse().map_err(anyhow::Error::from)?;
    let access_token = tokens.issue(user_id, &user.email, role, now)?;

    Ok(AuthResponse {
        access_token,
        token_type: "bearer".into(),
        user_id,
        role,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingMailer;

    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send_otp(&self, _to: &str, _code: &str) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }
    }

    fn t0() -> DateTime<Utc> {
        pitchlink_db::parse_timestamp("2025-06-01 10:00:00").unwrap()
    }

    fn signup_req(email: &str, otp: &str) -> VerifyOtpAndSignupRequest {
        VerifyOtpAndSignupRequest {
            email: email.into(),
            otp: otp.into(),
            password: "hunter2hunter2".into(),
            role: Role::Startup,
        }
    }

    #[test]
    fn code_valid_until_just_before_expiry() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        let mailer = RecordingMailer::default();

        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        let code = mailer.last_code();
        let ok = verify_and_signup(&db, &tokens, &signup_req("a@x.com", &code), t0() + Duration::seconds(119)).unwrap();
        assert_eq!(ok.email, "a@x.com");
        assert_eq!(ok.token_type, "bearer");
        assert!(!ok.access_token.is_empty());

        request_otp(&db, &mailer, "b@x.com", t0()).unwrap();
        let code = mailer.last_code();
        let at_expiry = verify_and_signup(&db, &tokens, &signup_req("b@x.com", &code), t0() + Duration::seconds(120));
        assert!(matches!(at_expiry, Err(ApiError::InvalidOrExpired)));
        let late = verify_and_signup(&db, &tokens, &signup_req("b@x.com", &code), t0() + Duration::seconds(121));
        assert!(matches!(late, Err(ApiError::InvalidOrExpired)));
    }

    #[test]
    fn code_is_single_use() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        let mailer = RecordingMailer::default();

        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        let code = mailer.last_code();
        verify_and_signup(&db, &tokens, &signup_req("a@x.com", &code), t0()).unwrap();
        let again = verify_and_signup(&db, &tokens, &signup_req("a@x.com", &code), t0());
        assert!(matches!(again, Err(ApiError::InvalidOrExpired)));
    }

    #[test]
    fn reissue_invalidates_previous_code() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        let mailer = RecordingMailer::default();

        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        let first = mailer.last_code();
        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        let second = mailer.last_code();

        let count = db.with_conn(|conn| queries::otps::count_for_email(conn, "a@x.com")).unwrap();
        assert_eq!(count, 1);
        if first != second {
            let stale = verify_and_signup(&db, &tokens, &signup_req("a@x.com", &first), t0());
            assert!(matches!(stale, Err(ApiError::InvalidOrExpired)));
        }
        verify_and_signup(&db, &tokens, &signup_req("a@x.com", &second), t0()).unwrap();
    }

    #[test]
    fn registered_email_cannot_request_again() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        let mailer = RecordingMailer::default();

        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        verify_and_signup(&db, &tokens, &signup_req("a@x.com", &mailer.last_code()), t0()).unwrap();
        assert!(matches!(
            request_otp(&db, &mailer, "A@X.com", t0()),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn existing_user_blocks_signup_and_keeps_code() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        let mailer = RecordingMailer::default();

        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        let code = mailer.last_code();
        // An account appears between issue and verify.
        db.with_conn(|conn| queries::users::insert(conn, "u0", "a@x.com", "investor", "h", "2025-06-01 10:00:01"))
            .unwrap();

        let res = verify_and_signup(&db, &tokens, &signup_req("a@x.com", &code), t0());
        assert!(matches!(res, Err(ApiError::Conflict(_))));
        let count = db.with_conn(|conn| queries::otps::count_for_email(conn, "a@x.com")).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn mail_failure_is_a_warning() {
        let db = Database::open_in_memory().unwrap();
        let resp = request_otp(&db, &FailingMailer, "a@x.com", t0()).unwrap();
        assert_eq!(resp.message, "OTP generated successfully");
        assert!(resp.warning.is_some());
        let count = db.with_conn(|conn| queries::otps::count_for_email(conn, "a@x.com")).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn input_validation() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        assert!(matches!(
            request_otp(&db, &RecordingMailer::default(), "not-an-email", t0()),
            Err(ApiError::Validation(_))
        ));
        let mut req = signup_req("a@x.com", "123456");
        req.password = "short".into();
        assert!(matches!(verify_and_signup(&db, &tokens, &req, t0()), Err(ApiError::Validation(_))));
    }

    #[test]
    fn login_is_generic_on_failure() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenIssuer::new("k");
        let mailer = RecordingMailer::default();
        request_otp(&db, &mailer, "a@x.com", t0()).unwrap();
        verify_and_signup(&db, &tokens, &signup_req("a@x.com", &mailer.last_code()), t0()).unwrap();

        let good = LoginRequest { email: "a@x.com".into(), password: "hunter2hunter2".into() };
        let resp = login(&db, &tokens, &good, Utc::now()).unwrap();
        assert_eq!(resp.role, Role::Startup);

        let wrong_pw = LoginRequest { email: "a@x.com".into(), password: "nope-nope".into() };
        let unknown = LoginRequest { email: "z@x.com".into(), password: "hunter2hunter2".into() };
        for req in [wrong_pw, unknown] {
            match login(&db, &tokens, &req, Utc::now()) {
                Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, BAD_LOGIN),
                other => panic!("expected Unauthorized, got {other:?}"),
            }
        }
    }
}
