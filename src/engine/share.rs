use serde::Serialize;
use urlencoding::encode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub text: String,
    pub whatsapp: String,
    pub twitter: String,
    pub maps: String,
}

impl ShareLinks {
    pub fn for_event(url: &str, title: &str, location: &str) -> Self {
        let text = format!("Check out this event: {}", title);
        let whatsapp_message = format!("{}\n\n{}", text, url);

        Self {
            whatsapp: format!("https://wa.me/?text={}", encode(&whatsapp_message)),
            twitter: format!(
                "https://twitter.com/intent/tweet?text={}&url={}",
                encode(&text),
                encode(url)
            ),
            maps: format!("https://maps.google.com/?q={}", encode(location)),
            url: url.to_string(),
            text,
        }
    }
}
