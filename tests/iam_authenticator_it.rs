// crates.io
use httpmock::prelude::*;
// self
use security_advisor_sdk::{
	_preludet::*,
	auth::{self, IamAuthenticator, ReqwestIamAuthenticator},
	error::TokenError,
	http::ReqwestHttpClient,
	location::ServiceName,
};

fn iam(server: &MockServer) -> ReqwestIamAuthenticator {
	IamAuthenticator::with_http_client("my-api-key", ReqwestHttpClient::default())
		.expect("API key should be accepted.")
		.with_url(&server.url("/identity/token"))
		.expect("Mock IAM URL should parse.")
}

fn token_body() -> String {
	format!(
		"{{\"access_token\":\"{MOCK_TOKEN}\",\"refresh_token\":\"r\",\"token_type\":\"Bearer\",\"expires_in\":3600}}"
	)
}

#[tokio::test]
async fn api_key_is_exchanged_once_and_cached() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.header("accept", "application/json");
			then.status(200).header("content-type", "application/json").body(token_body());
		})
		.await;
	let auth = iam(&server);
	let first = auth.access_token().await.expect("First exchange should succeed.");
	let second = auth.access_token().await.expect("Cached token should be reused.");

	assert_eq!(first.expose(), MOCK_TOKEN);
	assert_eq!(first, second);

	let extracted =
		auth::extract_account_and_token(&auth).await.expect("IAM token should carry an account.");

	assert_eq!(extracted.account.as_ref(), "123");

	token_mock.assert_calls_async(1).await;

	auth.invalidate();
	auth.access_token().await.expect("Invalidated token should be exchanged again.");

	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body())
				.delay(std::time::Duration::from_millis(50));
		})
		.await;
	let auth = iam(&server);
	let (first, second) = tokio::join!(auth.access_token(), auth.access_token());

	assert_eq!(
		first.expect("First caller should succeed."),
		second.expect("Second caller should succeed.")
	);

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_credentials_are_sent_as_basic_auth() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/token").header("authorization", "Basic Yng6Yng=");
			then.status(200).header("content-type", "application/json").body(token_body());
		})
		.await;
	let auth = iam(&server).with_client_credentials("bx", "bx");

	auth.access_token().await.expect("Exchange with client credentials should succeed.");

	token_mock.assert_async().await;
}

#[tokio::test]
async fn rejected_api_key_maps_to_exchange_error() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"errorCode\":\"BXNIM0415E\"}");
		})
		.await;
	let auth = iam(&server);
	let err = auth.access_token().await.expect_err("Rejected API keys must fail.");

	assert!(matches!(err, Error::Token(TokenError::Exchange { status: 400, .. })));
	assert!(!err.is_retryable());
}

#[tokio::test]
async fn iam_credentials_drive_location_resolution() {
	let server = MockServer::start_async().await;
	let authorization = format!("Bearer {MOCK_TOKEN}");
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/token");
			then.status(200).header("content-type", "application/json").body(token_body());
		})
		.await;
	let _settings = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/accounts/123/settings")
				.header("authorization", authorization.as_str());
			then.status(200).body(r#"{"location":{"id":"us"}}"#);
		})
		.await;
	let _details = server
		.mock_async(|when, then| {
			when.method(GET).path("/locations/us").header("authorization", authorization.as_str());
			then.status(200).body(
				r#"{"id":"us","si_notifications_endpoint_url":"https://us-south.example.com/notifications"}"#,
			);
		})
		.await;
	let resolver = build_reqwest_test_resolver(&server.base_url());
	let url = resolver
		.resolve_service_url(&iam(&server), ServiceName::Notifications)
		.await
		.expect("IAM-backed resolution should succeed.");

	assert_eq!(url, "https://us-south.example.com/notifications");
}
