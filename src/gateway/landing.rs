use crate::config::Config;
use crate::shopify::ShopDomain;
use tera::{Context, Tera};

const LANDING_TEMPLATE_NAME: &str = "landing.html";

const LANDING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="shopify-api-key" content="{{ api_key }}">
  <title>Ask Me Anything</title>
</head>
<body>
  <main>
    <h1>Ask Me Anything</h1>
    {% if shop %}
    <p>Installed on <strong>{{ shop }}</strong>.</p>
    {% else %}
    <p>Open this app from your Shopify admin.</p>
    {% endif %}
    <p>Add the <em>Ask Me Anything</em> block to a product template in the theme editor.
       Shoppers' questions are answered through the app proxy at <code>{{ proxy_path }}</code>.</p>
    <p class="meta">{{ environment }} &middot; v{{ version }}</p>
  </main>
</body>
</html>
"#;

/// Embedded admin landing page.
pub struct LandingPage {
    tera: Tera,
}

impl LandingPage {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(LANDING_TEMPLATE_NAME, LANDING_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render(&self, config: &Config, shop: Option<&ShopDomain>) -> anyhow::Result<String> {
        let mut context = Context::new();
        context.insert("api_key", config.shopify.api_key.as_deref().unwrap_or(""));
        context.insert("shop", &shop.map(ShopDomain::as_str));
        context.insert("proxy_path", crate::widget::DEFAULT_PROXY_PATH);
        context.insert("environment", &config.environment.to_string());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        Ok(self.tera.render(LANDING_TEMPLATE_NAME, &context)?)
    }
}

impl std::fmt::Debug for LandingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandingPage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_shop_and_api_key() {
        let mut config = Config::default();
        config.shopify.api_key = Some("client-id-123".into());
        let shop = ShopDomain::parse("demo.myshopify.com").unwrap();

        let html = LandingPage::new().unwrap().render(&config, Some(&shop)).unwrap();
        assert!(html.contains(r#"content="client-id-123""#));
        assert!(html.contains("<strong>demo.myshopify.com</strong>"));
    }

    #[test]
    fn renders_without_shop() {
        let html = LandingPage::new()
            .unwrap()
            .render(&Config::default(), None)
            .unwrap();
        assert!(html.contains("Open this app from your Shopify admin."));
    }

    #[test]
    fn api_key_is_escaped() {
        let mut config = Config::default();
        config.shopify.api_key = Some(r#""><script>"#.into());
        let html = LandingPage::new().unwrap().render(&config, None).unwrap();
        assert!(!html.contains("<script>"));
    }
}
