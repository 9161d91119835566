use hyper::Method;

/// Endpoints of the JSON API; each alias pair maps to one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Proxy,
    ListHistory,
    ClearHistory,
    GetRecord(String),
    DeleteRecord(String),
    Version,
    Health,
    MethodNotAllowed,
    NotFound,
}

impl Route {
    pub fn resolve(method: &Method, path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["api", "test"] | ["api", "request"] => match method {
                m if m == Method::POST => Route::Proxy,
                _ => Route::MethodNotAllowed,
            },
            ["api", "history"] | ["api", "requests"] => match method {
                m if m == Method::GET => Route::ListHistory,
                m if m == Method::DELETE => Route::ClearHistory,
                _ => Route::MethodNotAllowed,
            },
            ["api", "requests", id] | ["api", "request", id] => match method {
                m if m == Method::GET => Route::GetRecord(id.to_string()),
                m if m == Method::DELETE => Route::DeleteRecord(id.to_string()),
                _ => Route::MethodNotAllowed,
            },
            ["api", "version"] if method == Method::GET => Route::Version,
            ["health"] if method == Method::GET => Route::Health,
            _ => Route::NotFound,
        }
    }
}

/// `?limit=N` on history listings; anything unparsable is ignored.
pub fn query_limit(query: Option<&str>) -> Option<usize> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "limit")
        .and_then(|(_, value)| value.parse::<usize>().ok())
}
