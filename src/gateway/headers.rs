//! Framing headers for the embedded admin app.

use crate::shopify::ShopDomain;
use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

pub const ADMIN_ORIGIN: &str = "https://admin.shopify.com";
const ANY_SHOP_ORIGIN: &str = "https://*.myshopify.com";

/// `frame-ancestors` directive: the admin plus either one shop or any shop.
pub fn frame_ancestors(shop: Option<&ShopDomain>) -> String {
    let shop_origin = shop.map_or_else(|| ANY_SHOP_ORIGIN.to_string(), ShopDomain::origin);
    format!("frame-ancestors {ADMIN_ORIGIN} {shop_origin}")
}

/// Valid `shop` query parameter, if present.
pub fn shop_from_query(query: Option<&str>) -> Option<ShopDomain> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "shop")
        .and_then(|(_, value)| ShopDomain::parse(&value).ok())
}

/// Sets `Content-Security-Policy`, `X-Frame-Options` and `X-Content-Type-Options`
/// on every response.
pub(super) async fn security_headers(request: Request, next: Next) -> Response {
    let shop = if request.uri().path() == "/" {
        shop_from_query(request.uri().query())
    } else {
        None
    };

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    if let Ok(csp) = HeaderValue::from_str(&frame_ancestors(shop.as_ref())) {
        headers.insert(header::CONTENT_SECURITY_POLICY, csp);
    }
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
