pub async fn health() -> &'static str {
    "Server is running"
}
