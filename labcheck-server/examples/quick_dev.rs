use serde_json::json;

const URL: &str = "http://localhost:5000";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let hc = httpc_test::new_client(URL)?;

    hc.do_get("/").await?.print().await?;
    hc.do_get("/check/Lab1").await?.print().await?;

    let response = hc.do_post("/run_check/Lab1", json!({})).await?;
    response.print().await?;
    println!("{}", response.text_body()?);

    Ok(())
}
