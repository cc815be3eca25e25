use rocket::{catch, catchers, get, options, response::content::RawHtml, routes};

const HOMEPAGE: &str = include_str!("../../public/index.html");

#[get("/")]
fn homepage() -> RawHtml<&'static str> {
    RawHtml(HOMEPAGE)
}

/// Preflight requests are answered for any path with an empty body.
#[options("/<_..>")]
fn preflight() {}

#[catch(404)]
fn not_found() -> &'static str {
    "Not Found"
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing homepage", |rocket| async {
        rocket
            .mount("/", routes![homepage, preflight])
            .register("/", catchers![not_found])
    })
}
