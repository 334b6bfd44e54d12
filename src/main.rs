#[tokio::main]
async fn main() {
    facility_backend::run().await;
}
