//! Till POS terminal binary.

#[tokio::main]
async fn main() {
    if let Err(err) = till_terminal::run().await {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
