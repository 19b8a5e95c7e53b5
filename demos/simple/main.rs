pub fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/data/experiments.json".to_owned());
    let client = yatz::ClientConfig::from_file(path)
        .and_then(|config| config.to_client())
        .unwrap();

    // Let the analytics side know which experiments are running.
    client.warmup();

    // Roll a user into an experiment. This also fires a `rolled__button_color` exposure event.
    let variant = client.roll("test-subject", "button_color");
    println!("Assignment: {:?}", variant);

    client.fire("test-subject", "purchase", 19.99);

    println!("All assignments: {:?}", client.get_all("test-subject"));
}
