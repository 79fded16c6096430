pub const CONTENT_TYPE: &str = "application/xml";

/// Messaging-gateway reply: one `<Message>` per image, with the text on the first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TwimlReply {
    body: String,
    media_urls: Vec<String>,
}

impl TwimlReply {
    pub fn text(body: impl Into<String>) -> Self {
        Self { body: body.into(), media_urls: Vec::new() }
    }

    pub fn with_media<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn render(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);

        if self.media_urls.is_empty() {
            push_message(&mut xml, Some(&self.body), None);
        } else {
            for (index, url) in self.media_urls.iter().enumerate() {
                let body = (index == 0).then_some(self.body.as_str());
                push_message(&mut xml, body, Some(url));
            }
        }

        xml.push_str("</Response>");
        xml
    }
}

fn push_message(xml: &mut String, body: Option<&str>, media_url: Option<&str>) {
    xml.push_str("<Message>");
    if let Some(body) = body {
        xml.push_str("<Body>");
        xml.push_str(&escape(body));
        xml.push_str("</Body>");
    }
    if let Some(url) = media_url {
        xml.push_str("<Media>");
        xml.push_str(&escape(url));
        xml.push_str("</Media>");
    }
    xml.push_str("</Message>");
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
