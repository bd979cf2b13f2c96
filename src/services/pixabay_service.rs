use reqwest::Client;
use serde::Deserialize;
use std::env;

const PIXABAY_URL: &str = "https://pixabay.com/api/";

#[derive(Debug, Deserialize)]
struct PixabayResponse {
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL")]
    webformat_url: Option<String>,
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
}

/// Fetch up to `count` stock photo URLs for a destination. Image lookups
/// are cosmetic, so every failure path degrades to an empty list instead
/// of surfacing an error to the caller.
pub async fn get_destination_images(query: &str, count: usize) -> Vec<String> {
    let Ok(api_key) = env::var("PIXABAY_API_KEY") else {
        eprintln!("PIXABAY_API_KEY not set, skipping destination images");
        return Vec::new();
    };

    let per_page = count.to_string();
    let response = match Client::new()
        .get(PIXABAY_URL)
        .query(&[
            ("key", api_key.as_str()),
            ("q", query),
            ("image_type", "photo"),
            ("orientation", "horizontal"),
            ("category", "places,travel,buildings"),
            ("safesearch", "true"),
            ("per_page", per_page.as_str()),
        ])
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            eprintln!("Pixabay request failed for '{}': {}", query, e);
            return Vec::new();
        }
    };

    if !response.status().is_success() {
        eprintln!("Pixabay returned {} for '{}'", response.status(), query);
        return Vec::new();
    }

    let parsed: PixabayResponse = match response.json().await {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Pixabay response unreadable for '{}': {}", query, e);
            return Vec::new();
        }
    };

    parsed
        .hits
        .into_iter()
        .filter_map(|hit| hit.webformat_url.or(hit.large_image_url))
        .take(count)
        .collect()
}
