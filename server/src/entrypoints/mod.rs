use rocket::{fairing::AdHoc, http::Header};

pub mod cards;
pub mod home;

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .attach(cors())
            .attach(home::stage())
            .attach(cards::stage())
    })
}

/// Cards are embedded from arbitrary pages, so every response is readable cross-origin.
fn cors() -> AdHoc {
    AdHoc::on_response("CORS headers", |_, response| {
        Box::pin(async move {
            response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
            response.set_header(Header::new("Access-Control-Allow-Methods", "GET, OPTIONS"));
            response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        })
    })
}
