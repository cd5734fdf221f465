use litblogs_mock_server::MockServer;
use rand::SeedableRng;

fn main() {
    let seed = match std::env::args().nth(1) {
        Some(s) => s.parse().expect("seed must be an integer"),
        None => rand::random(),
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut server = MockServer::new();
    let thread = tests::populate(&mut server, &mut rng);
    let comments = server
        .export_thread(thread.post)
        .expect("exporting the just-populated thread");
    eprintln!("seed {seed}, post {}", thread.post.0);
    println!(
        "{}",
        serde_json::to_string_pretty(&comments).expect("serializing comments")
    );
}
