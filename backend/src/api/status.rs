use rocket::get;

#[get("/")]
pub fn index() -> &'static str {
    "Trending analytics backend is running"
}
