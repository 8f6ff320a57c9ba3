use std::{net::Ipv4Addr, path::Path, sync::Arc, time::Duration};

use folio_demo::{submission, JANE, JANE_SUBMISSION};
use folio_extern_contracts::relay::{RelayApiService, RelaySubmission, RelaySubmitError};
use folio_extern_impl::{
    http::HttpClient,
    relay::{RelayApiServiceConfig, RelayApiServiceImpl},
};
use folio_testing::relay::{
    ReceivedSubmission, RelayState, MALFORMED_MESSAGE, REFUSED_NAME, REJECTED_EMAIL_DOMAIN,
};
use folio_utils::assert_matches;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use url::Url;

#[tokio::test]
async fn success() {
    let relay = TestRelay::start().await;
    let sut = relay.sut(false);

    sut.submit(JANE_SUBMISSION.clone()).await.unwrap();

    assert_eq!(
        relay.state.received().await,
        [ReceivedSubmission {
            recipient: "test@example.com".into(),
            name: "Jane".into(),
            email: "jane@x.com".into(),
            message: "Hello".into(),
            subject: "Portfolio Contact from Jane".into(),
        }]
    );
}

#[tokio::test]
async fn success_with_body_inspection() {
    let relay = TestRelay::start().await;
    let sut = relay.sut(true);

    sut.submit(JANE_SUBMISSION.clone()).await.unwrap();
}

#[tokio::test]
async fn rejected() {
    let relay = TestRelay::start().await;
    let sut = relay.sut(false);

    let result = sut
        .submit(RelaySubmission {
            email: format!("jane{REJECTED_EMAIL_DOMAIN}"),
            ..JANE_SUBMISSION.clone()
        })
        .await;

    assert_matches!(
        result,
        Err(RelaySubmitError::Rejected {
            status: 422,
            reason: Some(_),
        })
    );
}

#[tokio::test]
async fn refused_in_body_is_ignored_by_default() {
    let relay = TestRelay::start().await;
    let sut = relay.sut(false);

    let result = sut.submit(refused()).await;

    result.unwrap();
}

#[tokio::test]
async fn refused_in_body_with_body_inspection() {
    let relay = TestRelay::start().await;
    let sut = relay.sut(true);

    let result = sut.submit(refused()).await;

    assert_matches!(
        result,
        Err(RelaySubmitError::Rejected {
            status: 200,
            reason: Some(_),
        })
    );
}

#[tokio::test]
async fn malformed_with_body_inspection() {
    let relay = TestRelay::start().await;
    let sut = relay.sut(true);

    let result = sut
        .submit(RelaySubmission {
            message: MALFORMED_MESSAGE.into(),
            ..JANE_SUBMISSION.clone()
        })
        .await;

    assert_matches!(result, Err(RelaySubmitError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = format!("http://{addr}/ajax/test@example.com").parse().unwrap();
    let sut = make_sut(endpoint, false, Some(Duration::from_secs(5)));

    let result = sut.submit(JANE_SUBMISSION.clone()).await;

    assert_matches!(result, Err(RelaySubmitError::Transport(_)));
}

#[tokio::test]
async fn endpoint_from_config() {
    let relay = TestRelay::start().await;
    let endpoint_override = format!("relay.endpoint = \"{}\"", relay.endpoint);
    let config =
        folio_config::load_with_override(&[] as &[&Path], &[endpoint_override.as_str()]).unwrap();

    let sut = make_sut(config.relay.endpoint, config.relay.inspect_response_body, None);

    sut.submit(JANE_SUBMISSION.clone()).await.unwrap();
    assert_eq!(relay.state.received().await.len(), 1);
}

fn refused() -> RelaySubmission {
    let mut draft = JANE.clone();
    draft.name = REFUSED_NAME.into();
    submission(&draft)
}

fn make_sut(
    endpoint: Url,
    inspect_response_body: bool,
    timeout: Option<Duration>,
) -> RelayApiServiceImpl {
    let mut config = RelayApiServiceConfig::new(Some(endpoint));
    config.inspect_response_body = inspect_response_body;
    RelayApiServiceImpl::new(config, HttpClient::new(timeout).unwrap())
}

struct TestRelay {
    endpoint: Url,
    state: Arc<RelayState>,
}

impl TestRelay {
    async fn start() -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::<RelayState>::default();
        tokio::spawn(folio_testing::relay::serve(listener, Arc::clone(&state)));

        Self {
            endpoint: format!("http://{addr}/ajax/test@example.com").parse().unwrap(),
            state,
        }
    }

    fn sut(&self, inspect_response_body: bool) -> RelayApiServiceImpl {
        make_sut(self.endpoint.clone(), inspect_response_body, None)
    }
}
