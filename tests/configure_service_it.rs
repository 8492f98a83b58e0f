// crates.io
use httpmock::prelude::*;
// self
use security_advisor_sdk::{
	_preludet::*,
	client,
	config::ServiceConfig,
	error::ConfigError,
	http::ReqwestHttpClient,
	location::ServiceName,
};

const US_NOTIFICATIONS: &str = "https://us-south.secadvisor.cloud.ibm.com/notifications";
const US_FINDINGS: &str = "https://us-south.secadvisor.cloud.ibm.com/findings";

async fn mock_us_location(server: &MockServer, findings: &str) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/accounts/123/settings");
			then.status(200).body(r#"{"location":{"id":"us"}}"#);
		})
		.await;

	let body = format!(
		r#"{{"id":"us","si_notifications_endpoint_url":"{US_NOTIFICATIONS}","si_findings_endpoint_url":"{findings}"}}"#
	);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/locations/us");
			then.status(200).body(body);
		})
		.await;
}

#[tokio::test]
async fn matching_requested_url_is_adopted() {
	let server = MockServer::start_async().await;

	mock_us_location(&server, US_FINDINGS).await;

	let resolver = build_reqwest_test_resolver(&server.base_url());
	let config = resolver
		.configure_service(
			mock_authenticator().as_ref(),
			ServiceName::Findings,
			Some(US_FINDINGS),
		)
		.await
		.expect("Matching URL should configure the client.");

	assert_eq!(config.base_url.as_str(), US_FINDINGS);
	assert_eq!(config.location.location_id.as_ref(), "us");
	assert_eq!(
		config
			.operation_url(["123", "providers"])
			.expect("Findings base should carry segments.")
			.as_str(),
		"https://us-south.secadvisor.cloud.ibm.com/findings/v1/123/providers"
	);
}

#[tokio::test]
async fn mismatched_requested_url_blocks_configuration() {
	let server = MockServer::start_async().await;

	mock_us_location(&server, US_FINDINGS).await;

	let resolver = build_reqwest_test_resolver(&server.base_url());
	let err = resolver
		.configure_service(
			mock_authenticator().as_ref(),
			ServiceName::Notifications,
			Some("https://eu-gb.secadvisor.cloud.ibm.com/notifications"),
		)
		.await
		.expect_err("A URL for another region must be rejected.");

	assert!(matches!(
		&err,
		Error::Mismatch { service: ServiceName::Notifications, expected, actual }
			if expected == US_NOTIFICATIONS && actual.starts_with("https://eu-gb.")
	));
	assert!(err.to_string().contains(US_NOTIFICATIONS));
}

#[tokio::test]
async fn missing_endpoint_is_a_configuration_error() {
	let server = MockServer::start_async().await;

	mock_us_location(&server, "").await;

	let resolver = build_reqwest_test_resolver(&server.base_url());
	let err = resolver
		.configure_service(mock_authenticator().as_ref(), ServiceName::Findings, None)
		.await
		.expect_err("An empty endpoint cannot back a client.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingEndpoint { ref location, service: ServiceName::Findings })
			if location == "us"
	));
	// The location itself still resolved.
	assert!(resolver.cached_location("123").is_some());
}

#[tokio::test]
async fn environment_configuration_drives_the_client() {
	let server = MockServer::start_async().await;

	mock_us_location(&server, US_FINDINGS).await;

	let config = ServiceConfig::from_lookup(ServiceName::Notifications, |key| match key {
		"NOTIFICATIONS_API_AUTH_TYPE" => Some("bearerToken".into()),
		"NOTIFICATIONS_API_BEARER_TOKEN" => Some(MOCK_TOKEN.into()),
		"NOTIFICATIONS_API_URL" => Some(US_NOTIFICATIONS.into()),
		_ => None,
	})
	.expect("Bearer token configuration should load.");
	let auth = config
		.auth
		.build_with::<ReqwestHttpClient>(ReqwestHttpClient::default())
		.expect("Bearer authenticator should build.");
	let resolver = build_reqwest_test_resolver(&server.base_url());
	let client_config = resolver
		.configure_service(auth.as_ref(), config.service, config.url.as_deref())
		.await
		.expect("Configured URL matches the resolved location.");
	let headers = client::sdk_headers(client_config.service, "V1", "ListAllChannels");

	assert_eq!(client_config.base_url.as_str(), US_NOTIFICATIONS);
	assert!(headers.contains_key("X-IBMCloud-SDK-Analytics"));
}
