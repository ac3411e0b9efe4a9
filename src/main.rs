#[tokio::main]
async fn main() -> std::io::Result<()> {
    session_booking::run().await
}
