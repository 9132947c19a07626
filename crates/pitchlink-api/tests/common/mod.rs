#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use pitchlink_api::auth::AppStateInner;
use pitchlink_api::credentials::TokenIssuer;
use pitchlink_api::mailer::Mailer;
use pitchlink_api::routes;
use pitchlink_api::storage::Storage;
use pitchlink_db::Database;

const BOUNDARY: &str = "pitchlink-test-boundary";

/// Keeps every `(to, code)` pair so tests can read the OTP back.
#[derive(Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<(String, String)>>>);

impl Outbox {
    pub fn code_for(&self, email: &str) -> String {
        let sent = self.0.lock().unwrap();
        sent.iter()
            .rev()
            .find(|(to, _)| to.eq_ignore_ascii_case(email.trim()))
            .map(|(_, code)| code.clone())
            .unwrap_or_else(|| panic!("no OTP sent to {email}"))
    }
}

impl Mailer for Outbox {
    fn send_otp(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.0.lock().unwrap().push((to.to_string(), code.to_string()));
        Ok(())
    }
}

pub enum Part<'a> {
    Text { name: &'a str, value: String },
    File { name: &'a str, filename: &'a str, content_type: &'a str, bytes: &'a [u8] },
}

pub struct TestApp {
    pub router: Router,
    pub outbox: Outbox,
    pub uploads: TempDir,
}

pub struct Account {
    pub token: String,
    pub user_id: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = TempDir::new().unwrap();
        let outbox = Outbox::default();
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            tokens: TokenIssuer::new("integration-test-secret"),
            mailer: Box::new(outbox.clone()),
            storage: Storage::new(uploads.path().to_path_buf()).await.unwrap(),
        });
        Self { router: routes::router(state), outbox, uploads }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, body, headers)
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes, _) = self.send(req).await;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    pub async fn upload(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> (StatusCode, Value) {
        self.form(method, uri, token, &[Part::File { name: field, filename, content_type, bytes }])
            .await
    }

    pub async fn form(&self, method: &str, uri: &str, token: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for part in parts {
            match part {
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File { name, filename, content_type, bytes } => {
                    body.extend_from_slice(
                        format!(
                            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        let (status, bytes, _) = self.send(req).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Full OTP signup; returns the bearer token and user id.
    pub async fn sign_up(&self, email: &str, role: &str) -> Account {
        let (status, _) = self.call("POST", "/auth/send-otp", None, Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::OK);

        let code = self.outbox.code_for(email);
        let (status, body) = self
            .call(
                "POST",
                "/auth/verify-otp-and-signup",
                None,
                Some(json!({ "email": email, "otp": code, "password": "correct-horse", "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Account {
            token: body["access_token"].as_str().unwrap().to_string(),
            user_id: body["user_id"].as_str().unwrap().to_string(),
        }
    }
}

pub fn startup_profile_body(company_name: &str) -> Value {
    json!({
        "company_name": company_name,
        "industry": "Fintech",
        "company_description": "Payments for small merchants",
        "founding_date": "2022-04-01",
        "team_size": 12,
        "district": "Central",
        "state": "Karnataka",
        "business_model_description": "Per-transaction fee",
        "total_paying_customers": 340,
        "competitive_advantage": "Offline-first terminals",
        "product_demo_video_link": "https://video.example.com/demo",
        "pre_money_valuation": 4000000,
        "amount_seeking": 750000,
        "investment_type": "Equity",
        "max_equity_percentage": 15.0,
        "funding_stage": "Seed",
        "total_funding_raised": 250000,
        "last_round_amount": 250000,
        "last_round_date": "2023-09-15",
        "key_previous_investors": "Angel syndicate",
        "founders": [{
            "name": "Asha Rao",
            "educational_qualification": "B.Tech",
            "previous_work_experience": "Payments PM",
            "linkedin_profile": "https://linkedin.com/in/asha",
            "photo_url": "https://img.example.com/asha.png"
        }],
        "revenue_metrics": {
            "monthly_recurring_revenue": 42000,
            "annual_recurring_revenue": 504000,
            "profitability_timeline": "18 months",
            "investment_timeline": "Q3"
        },
        "fund_usage": {
            "product_development_percentage": 40.0,
            "marketing_percentage": 30.0,
            "team_expansion_percentage": 20.0,
            "operations_percentage": 10.0
        }
    })
}

pub fn investor_profile_body(full_name: &str) -> Value {
    json!({
        "full_name": full_name,
        "email": "ivy@fund.example",
        "country": "India",
        "state": "Maharashtra",
        "district": "Mumbai",
        "linkedin_profile": "https://linkedin.com/in/ivy",
        "investor_type": "Angel",
        "investment_experience": "Experienced",
        "years_of_investment_experience": "5-10",
        "professional_background": ["Operator"],
        "investment_stages": ["Seed", "Series A"],
        "check_size_range": "25k-100k",
        "geographic_focus": ["South Asia"],
        "industry_focus": ["Fintech"],
        "investment_philosophy": "Back founders early",
        "decision_timeline": "2-4 weeks",
        "post_investment_involvement": "Advisory",
        "areas_of_expertise": ["Go-to-market"],
        "profile_visibility": "public",
        "contact_permissions": "all"
    })
}
