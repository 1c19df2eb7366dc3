use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::request::ApiRequest;
use crate::api::response::{ApiResponse, ApiResult, ProxyResponse};
use crate::error::ApiError;
use crate::handlers::{history, image, music, settings};
use crate::services::Services;
use crate::types::HttpMethod;

/// `Access-Control-Allow-Methods` for paths the dispatcher does not know
pub const UNROUTED_ALLOW_METHODS: &str = "OPTIONS";

/// The fixed set of routed paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    UserSettings,
    UserImage,
    Music,
    MusicList,
    HistoryList,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::UserSettings,
        Route::UserImage,
        Route::Music,
        Route::MusicList,
        Route::HistoryList,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::UserSettings => "/user/settings",
            Route::UserImage => "/user/image",
            Route::Music => "/music",
            Route::MusicList => "/music/list",
            Route::HistoryList => "/history/list",
        }
    }

    /// Exact match; a single trailing slash is ignored
    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn allow_methods(self) -> &'static str {
        match self {
            Route::UserSettings => "OPTIONS,GET,PUT",
            Route::UserImage => "OPTIONS,GET,POST",
            Route::Music => "OPTIONS,GET,POST,DELETE",
            Route::MusicList => "OPTIONS,GET",
            Route::HistoryList => "OPTIONS,GET",
        }
    }
}

fn envelope<T: Serialize>(result: ApiResult<T>) -> Result<Value, ApiError> {
    result.and_then(ApiResponse::into_envelope)
}

/// Routes inbound requests to handlers and shapes every outcome into a
/// response envelope with CORS headers.
#[derive(Clone)]
pub struct Dispatcher {
    services: Services,
}

impl Dispatcher {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn dispatch(&self, request: ApiRequest) -> ProxyResponse {
        let route = Route::from_path(&request.path);
        let allow_methods = route.map_or(UNROUTED_ALLOW_METHODS, Route::allow_methods);

        let outcome = match route {
            Some(route) => self.call(route, &request).await,
            None => Err(ApiError::unsupported_path(request.path.as_str())),
        };

        match &outcome {
            Ok(_) => info!("{} {} -> 200", request.method, request.path),
            Err(err) => warn!(
                "{} {} -> {} [{}] {}",
                request.method,
                request.path,
                err.status_code(),
                err.error_code(),
                err
            ),
        }

        ProxyResponse::from_outcome(outcome, allow_methods)
    }

    /// Failure envelope for a request rejected before it reached a handler
    pub fn reject(&self, path: &str, err: ApiError) -> ProxyResponse {
        let allow_methods = Route::from_path(path).map_or(UNROUTED_ALLOW_METHODS, Route::allow_methods);
        warn!("{} rejected [{}] {}", path, err.error_code(), err);
        ProxyResponse::from_outcome(Err(err), allow_methods)
    }

    async fn call(&self, route: Route, request: &ApiRequest) -> Result<Value, ApiError> {
        let services = &self.services;
        match (route, &request.method) {
            (_, HttpMethod::Options) => envelope(Ok(ApiResponse::message_only("OK"))),

            (Route::UserSettings, HttpMethod::Get) => envelope(settings::get(services, request).await),
            (Route::UserSettings, HttpMethod::Put) => envelope(settings::put(services, request).await),

            (Route::UserImage, HttpMethod::Get) => envelope(image::get(services, request).await),
            (Route::UserImage, HttpMethod::Post) => envelope(image::post(services, request).await),

            (Route::Music, HttpMethod::Get) => envelope(music::get(services, request).await),
            (Route::Music, HttpMethod::Post) => envelope(music::post(services, request).await),
            (Route::Music, HttpMethod::Delete) => envelope(music::delete(services, request).await),

            (Route::MusicList, HttpMethod::Get) => envelope(music::list(services, request).await),

            (Route::HistoryList, HttpMethod::Get) => envelope(history::list(services, request).await),

            (_, method) => Err(ApiError::unsupported_method(method.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!(Route::from_path("/music"), Some(Route::Music));
        assert_eq!(Route::from_path("/music/list"), Some(Route::MusicList));
        assert_eq!(Route::from_path("/music/list/extra"), None);
        assert_eq!(Route::from_path("/Music"), None);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(Route::from_path("/history/list/"), Some(Route::HistoryList));
        assert_eq!(Route::from_path("/"), None);
    }

    #[test]
    fn every_route_allows_options() {
        for route in Route::ALL {
            assert!(route.allow_methods().starts_with("OPTIONS,"));
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }
}
