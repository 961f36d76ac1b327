use std::convert::Infallible;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use warp::{Filter, Rejection, Reply};

use crate::config::Config;
use crate::envelope::{self, CloudWatchEvent};
use crate::error::handle_rejection;
use crate::extract_rejection;
use crate::healthevent::time::format_timestamp;
use crate::healthevent::{self, DecodeError, Detail};

/// Receives health events. It holds no state, so one instance is shared by
/// every request.
#[derive(Debug, Default)]
pub struct Handler {}

impl Handler {
    pub fn new() -> Self {
        Handler {}
    }

    pub fn handle(&self, event: &CloudWatchEvent) -> Result<Detail, DecodeError> {
        debug!(
            "Received event {} from {} ({})",
            event.id, event.source, event.detail_type
        );

        let detail = match healthevent::parse_detail(event) {
            Ok(detail) => detail,
            Err(err) => {
                error!("Failed to decode detail of event {}: {}", event.id, err);
                return Err(err);
            }
        };

        if !detail.status_code.is_known() {
            warn!(
                "Unrecognised status code {:?} on {}",
                detail.status_code.as_str(),
                detail.event_arn
            );
        }
        info!(
            "{} {} [{}] started {}",
            detail.service,
            detail.event_type_code,
            detail.status_code,
            detail
                .start_time
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_owned())
        );
        info!("{:#?}", detail);

        Ok(detail)
    }
}

pub async fn receive_event(body: Bytes, handler: Arc<Handler>) -> Result<impl Reply, Rejection> {
    let event = extract_rejection!(
        envelope::parse_event(&body).with_context(|| "Invalid event envelope")
    )?;
    let detail = extract_rejection!(handler.handle(&event))?;
    Ok(warp::reply::json(&detail))
}

/// `POST /events`, with failures rendered by `handle_rejection`.
pub fn routes(
    config: &Config,
    handler: Arc<Handler>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let handler = warp::any().map(move || handler.clone());

    warp::path("events")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(config.body_limit_bytes))
        .and(warp::body::bytes())
        .and(handler)
        .and_then(receive_event)
        .recover(handle_rejection)
}
