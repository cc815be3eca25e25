use rocket::{
    get,
    http::{ContentType, Header},
    response::{self, Responder},
    routes, Request, Response, State,
};

use crate::{
    cache::{CardKind, CARD_TTL},
    cards::CardService,
    error::CardError,
    svg::error_card,
    theme::Theme,
};

pub enum Card {
    Rendered(String),
    Failed(CardError),
}

impl From<Result<String, CardError>> for Card {
    fn from(result: Result<String, CardError>) -> Self {
        match result {
            Ok(svg) => Self::Rendered(svg),
            Err(e) => Self::Failed(e),
        }
    }
}

impl<'r> Responder<'r, 'static> for Card {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Card::Rendered(svg) => {
                let max_age = CARD_TTL.as_secs();
                let expiration = chrono::Utc::now() + chrono::Duration::seconds(max_age as i64);

                Response::build()
                    .header(ContentType::SVG)
                    .header(Header::new(
                        "Cache-Control",
                        format!("public, max-age={max_age}"),
                    ))
                    .header(Header::new(
                        "Expires",
                        expiration.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
                    ))
                    .sized_body(svg.len(), std::io::Cursor::new(svg))
                    .ok()
            }
            Card::Failed(e @ CardError::MissingUsername) => {
                let message = e.to_string();
                Response::build()
                    .status(e.status())
                    .header(ContentType::Plain)
                    .sized_body(message.len(), std::io::Cursor::new(message))
                    .ok()
            }
            Card::Failed(e) => {
                let svg = error_card(&e.to_string());
                Response::build()
                    .status(e.status())
                    .header(ContentType::SVG)
                    .sized_body(svg.len(), std::io::Cursor::new(svg))
                    .ok()
            }
        }
    }
}

async fn render(
    cards: &CardService,
    kind: CardKind,
    username: Option<&str>,
    theme: Option<&str>,
) -> Card {
    let Some(username) = username.filter(|username| !username.trim().is_empty()) else {
        return Card::Failed(CardError::MissingUsername);
    };

    cards
        .card(kind, username, Theme::from_name(theme))
        .await
        .into()
}

#[get("/api/stats?<username>&<theme>")]
async fn get_stats(
    username: Option<&str>,
    theme: Option<&str>,
    cards: &State<CardService>,
) -> Card {
    render(cards, CardKind::Stats, username, theme).await
}

#[get("/api/languages?<username>&<theme>")]
async fn get_languages(
    username: Option<&str>,
    theme: Option<&str>,
    cards: &State<CardService>,
) -> Card {
    render(cards, CardKind::Languages, username, theme).await
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing card entrypoints", |rocket| async {
        rocket.mount("/", routes![get_stats, get_languages])
    })
}
