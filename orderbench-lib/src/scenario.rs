use rama::{
    Service,
    error::{BoxError, ErrorContext as _},
    http::{Request, Response, body::util::BodyExt as _, service::client::HttpClientExt as _},
    telemetry::tracing,
    utils::str::arcstr::ArcStr,
};

use rand::rngs::SmallRng;
use tokio::time::Instant;

use crate::{
    endpoint::EndpointProfile,
    order::{Order, OrderShape, generate_order_with},
    outcome::{FailureReason, Outcome, Submission, classify},
    runner::ScenarioTask,
};

/// Submit an order as JSON to the profile's endpoint and classify the response.
///
/// The call, response body included, is bounded by `profile.timeout`.
/// It never errors: transport failures and timeouts are reported as
/// [`Outcome::Failure`].
pub async fn submit<S>(
    client: &S,
    base: &str,
    order: &Order,
    profile: &EndpointProfile,
) -> Submission
where
    S: Service<Request, Output = Response, Error = BoxError>,
{
    let target = profile.target(base);

    let start = Instant::now();
    let result = tokio::time::timeout(profile.timeout, async {
        let resp = client.post(target.as_str()).json(order).send().await?;
        let status = resp.status();
        // a connection only returns to the pool once its body is read
        resp.into_body()
            .collect()
            .await
            .context("read response body")?;
        Ok::<_, BoxError>(status)
    })
    .await;
    let latency = start.elapsed();

    let outcome = match result {
        Ok(Ok(status)) => classify(status, profile.expected_status),
        Ok(Err(err)) => {
            tracing::debug!(
                error = %err,
                target = %target,
                order_id = %order.order_id,
                "order submission failed at transport level"
            );
            Outcome::Failure(FailureReason::ConnectionError)
        }
        Err(_) => {
            tracing::debug!(
                target = %target,
                order_id = %order.order_id,
                timeout = ?profile.timeout,
                "order submission timed out"
            );
            Outcome::Failure(FailureReason::Timeout)
        }
    };

    Submission { outcome, latency }
}

/// Scenario task: build a payload, submit it and classify the response.
#[derive(Debug, Clone)]
pub struct OrderTask<S> {
    name: ArcStr,
    client: S,
    base: ArcStr,
    profile: EndpointProfile,
    shape: OrderShape,
}

impl<S> OrderTask<S> {
    pub fn new(
        name: impl Into<ArcStr>,
        client: S,
        base: impl Into<ArcStr>,
        profile: EndpointProfile,
        shape: OrderShape,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            base: base.into(),
            profile,
            shape,
        }
    }

    pub fn profile(&self) -> &EndpointProfile {
        &self.profile
    }
}

impl<S> ScenarioTask for OrderTask<S>
where
    S: Service<Request, Output = Response, Error = BoxError>,
{
    fn name(&self) -> &ArcStr {
        &self.name
    }

    async fn execute(&self, rng: &mut SmallRng) -> Submission {
        let order = generate_order_with(rng, self.shape);
        submit(&self.client, &self.base, &order, &self.profile).await
    }
}
