//! Recipe Market Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    recipemarket_backend::run().await;
}
