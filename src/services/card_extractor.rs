use reqwest::{
    header::{COOKIE, REFERER, USER_AGENT},
    StatusCode,
};
use scraper::{ElementRef, Html, Selector};

use crate::models::{card::CardRecord, credentials::SessionToken};
use crate::services::portal::{PortalClient, BROWSER_USER_AGENT};

#[derive(thiserror::Error, Debug)]
pub enum CardExtractorError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Card page returned HTTP {0}")]
    UpstreamStatus(StatusCode),
}

/// The fields of a card, each located by one [`ExtractionRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Name,
    Photo,
    Course,
    Affiliation,
    Registration,
    ValidUntil,
}

/// How a single value is located in the card page.
///
/// Caption rules anchor on an element whose trimmed text equals `caption`
/// and read a sibling element named `sibling` after it.
#[derive(Debug, Clone, Copy)]
pub enum ExtractionRule {
    /// Text of the first element matching `selector`.
    Text { selector: &'static str },
    /// Attribute of the first element matching `selector`.
    Attribute {
        selector: &'static str,
        attr: &'static str,
    },
    /// The element right after the caption, if it is a `sibling`.
    NextSibling {
        caption_selector: &'static str,
        caption: &'static str,
        sibling: &'static str,
    },
    /// The first `sibling` anywhere after the caption.
    FollowingSibling {
        caption_selector: &'static str,
        caption: &'static str,
        sibling: &'static str,
    },
}

/// Layout of the portal's `carteira.php` page.
pub const CARD_RULES: [(CardField, ExtractionRule); 6] = [
    (
        CardField::Name,
        ExtractionRule::Text {
            selector: ".informacoess > h2",
        },
    ),
    (
        CardField::Photo,
        ExtractionRule::Attribute {
            selector: ".foto",
            attr: "src",
        },
    ),
    (
        CardField::Course,
        ExtractionRule::NextSibling {
            caption_selector: "h4",
            caption: "Curso:",
            sibling: "h3",
        },
    ),
    (
        CardField::Affiliation,
        ExtractionRule::NextSibling {
            caption_selector: "h4",
            caption: "Vínculo:",
            sibling: "h3",
        },
    ),
    (
        CardField::Registration,
        ExtractionRule::FollowingSibling {
            caption_selector: ".matricula h4",
            caption: "Matrícula:",
            sibling: "h3",
        },
    ),
    (
        CardField::ValidUntil,
        ExtractionRule::FollowingSibling {
            caption_selector: ".matricula h4",
            caption: "Validade:",
            sibling: "h3",
        },
    ),
];

impl ExtractionRule {
    /// Applies the rule, returning the trimmed value or `None` if the
    /// markup it anchors on is not there.
    pub fn apply(&self, document: &Html) -> Option<String> {
        match *self {
            ExtractionRule::Text { selector } => {
                let selector = parse_selector(selector)?;
                document.select(&selector).next().map(element_text)
            }
            ExtractionRule::Attribute { selector, attr } => {
                let selector = parse_selector(selector)?;
                document
                    .select(&selector)
                    .next()
                    .and_then(|el| el.value().attr(attr))
                    .map(|value| value.trim().to_string())
            }
            ExtractionRule::NextSibling {
                caption_selector,
                caption,
                sibling,
            } => find_caption(document, caption_selector, caption)?
                .next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|el| el.value().name() == sibling)
                .map(element_text),
            ExtractionRule::FollowingSibling {
                caption_selector,
                caption,
                sibling,
            } => find_caption(document, caption_selector, caption)?
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == sibling)
                .map(element_text),
        }
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!(selector = %selector, error = %e, "Invalid extraction selector");
            None
        }
    }
}

fn find_caption<'a>(
    document: &'a Html,
    caption_selector: &str,
    caption: &str,
) -> Option<ElementRef<'a>> {
    let selector = parse_selector(caption_selector)?;
    document
        .select(&selector)
        .find(|el| element_text(*el) == caption)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Fetches the card page with the session cookie and parses it.
#[tracing::instrument(skip_all)]
pub async fn extract(
    portal: &PortalClient,
    token: &SessionToken,
) -> Result<CardRecord, CardExtractorError> {
    let html = fetch_card_page(portal, token).await?;
    let card = parse_card(&html, &portal.config().photo_base());

    tracing::debug!(
        has_photo = card.photo_url.is_some(),
        "Card page parsed"
    );

    Ok(card)
}

pub async fn fetch_card_page(
    portal: &PortalClient,
    token: &SessionToken,
) -> Result<String, CardExtractorError> {
    let config = portal.config();

    let response = portal
        .page_http()
        .get(config.card_url())
        .header(COOKIE, token.expose())
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(REFERER, config.login_url())
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!(status = %status, "Card page request failed");
        return Err(CardExtractorError::UpstreamStatus(status));
    }

    Ok(response.text().await?)
}

/// Builds a [`CardRecord`] from the card page.
///
/// Never fails: a field whose markup is missing comes back as an empty
/// string, and a missing photo as `None`.
pub fn parse_card(html: &str, photo_base: &str) -> CardRecord {
    let document = Html::parse_document(html);

    let field = |wanted: CardField| -> Option<String> {
        CARD_RULES
            .iter()
            .find(|(field, _)| *field == wanted)
            .and_then(|(_, rule)| rule.apply(&document))
    };
    let text = |wanted: CardField| field(wanted).unwrap_or_default();

    CardRecord {
        name: text(CardField::Name),
        photo_url: field(CardField::Photo)
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", photo_base, path)),
        course: text(CardField::Course),
        affiliation_type: text(CardField::Affiliation),
        registration_id: text(CardField::Registration),
        valid_until: text(CardField::ValidUntil),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTO_BASE: &str = "https://aesa-cesa.br/carteirinha/public/";

    const CARD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
    <div class="carteira">
        <img class="foto" src="fotos/123.jpg" alt="Foto">
        <div class="informacoess">
            <h2>
                Maria Silva
            </h2>
            <h4>Curso:</h4>
            <h3> Engenharia </h3>
            <h4>Vínculo:</h4>
            <h3>Aluno</h3>
        </div>
        <div class="matricula">
            <h4>Matrícula:</h4>
            <span class="separador">|</span>
            <h3>12345</h3>
            <h4>Validade:</h4>
            <h3>12/2025</h3>
        </div>
    </div>
</body>
</html>"#;

    #[test]
    fn test_parse_complete_card() {
        let card = parse_card(CARD_PAGE, PHOTO_BASE);

        assert_eq!(
            card,
            CardRecord {
                name: "Maria Silva".to_string(),
                photo_url: Some("https://aesa-cesa.br/carteirinha/public/fotos/123.jpg".to_string()),
                course: "Engenharia".to_string(),
                affiliation_type: "Aluno".to_string(),
                registration_id: "12345".to_string(),
                valid_until: "12/2025".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_photo_is_none() {
        let html = CARD_PAGE.replace(r#"<img class="foto" src="fotos/123.jpg" alt="Foto">"#, "");
        let card = parse_card(&html, PHOTO_BASE);

        assert_eq!(card.photo_url, None);
        assert_eq!(card.name, "Maria Silva");
        assert_eq!(card.registration_id, "12345");
    }

    #[test]
    fn test_empty_photo_src_is_none() {
        let html = CARD_PAGE.replace(r#"src="fotos/123.jpg""#, r#"src="""#);
        assert_eq!(parse_card(&html, PHOTO_BASE).photo_url, None);
    }

    #[test]
    fn test_missing_caption_degrades_single_field() {
        let html = CARD_PAGE.replace("<h4>Curso:</h4>", "");
        let card = parse_card(&html, PHOTO_BASE);

        assert_eq!(card.course, "");
        assert_eq!(card.affiliation_type, "Aluno");
        assert_eq!(card.valid_until, "12/2025");
    }

    #[test]
    fn test_next_sibling_must_be_adjacent() {
        let html = CARD_PAGE.replace("<h3> Engenharia </h3>", "<p>x</p><h3>Engenharia</h3>");
        assert_eq!(parse_card(&html, PHOTO_BASE).course, "");
    }

    #[test]
    fn test_registration_caption_only_inside_matricula_block() {
        let html = r#"<div><h4>Matrícula:</h4><h3>99999</h3></div>"#;
        assert_eq!(parse_card(html, PHOTO_BASE).registration_id, "");
    }

    #[test]
    fn test_unrelated_document_yields_empty_record() {
        let card = parse_card("<html><body><p>Sessão expirada</p></body></html>", PHOTO_BASE);

        assert_eq!(card.name, "");
        assert_eq!(card.photo_url, None);
        assert_eq!(card.course, "");
        assert_eq!(card.affiliation_type, "");
        assert_eq!(card.registration_id, "");
        assert_eq!(card.valid_until, "");
    }

    #[test]
    fn test_every_field_has_a_rule() {
        for field in [
            CardField::Name,
            CardField::Photo,
            CardField::Course,
            CardField::Affiliation,
            CardField::Registration,
            CardField::ValidUntil,
        ] {
            assert!(CARD_RULES.iter().any(|(f, _)| *f == field), "{:?}", field);
        }
    }
}
