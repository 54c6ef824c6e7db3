use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target URL (e.g., http://localhost:8000)
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Number of voters to register
    #[arg(short, long, default_value_t = 100)]
    voters: usize,

    /// Number of voters running at the same time
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Duplicate concurrent cast attempts per voter; exactly one must win
    #[arg(short, long, default_value_t = 4)]
    attempts_per_voter: usize,
}

#[derive(Deserialize, Debug, Clone)]
struct Student {
    id: String,
    #[serde(rename = "voteCount")]
    vote_count: i32,
}

#[derive(Deserialize, Debug)]
struct Voter {
    id: String,
}

#[derive(Serialize)]
struct RegisterVoterRequest {
    name: String,
    email: String,
}

#[derive(Serialize)]
struct CastVoteRequest {
    #[serde(rename = "voterId")]
    voter_id: String,
    #[serde(rename = "studentId")]
    student_id: String,
}

fn random_tag() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

struct VoterOutcome {
    successes: usize,
    conflicts: usize,
}

async fn run_voter_simulation(
    client: &Client,
    base_url: &str,
    voter_idx: usize,
    attempts: usize,
    students: &[Student],
) -> Result<VoterOutcome> {
    // 1. Register a fresh voter
    let register_url = format!("{}/api/voters", base_url);
    let tag = random_tag();

    let voter: Voter = client
        .post(&register_url)
        .json(&RegisterVoterRequest {
            name: format!("LoadTestVoter_{}", voter_idx),
            email: format!("loadtest-{}-{}@example.com", tag, voter_idx),
        })
        .send()
        .await
        .context("Failed to send registration request")?
        .error_for_status()
        .context("Voter registration failed")?
        .json()
        .await
        .context("Failed to parse voter")?;

    // 2. Pick a student
    let student = {
        let mut rng = thread_rng();
        students.choose(&mut rng).context("No students available")?
    };

    // 3. Fire duplicate casts at the same time; the ledger must let
    //    exactly one through
    let vote_url = format!("{}/api/votes", base_url);
    let casts = (0..attempts).map(|_| {
        client.post(&vote_url).json(&CastVoteRequest {
            voter_id: voter.id.clone(),
            student_id: student.id.clone(),
        })
        .send()
    });

    let mut outcome = VoterOutcome {
        successes: 0,
        conflicts: 0,
    };
    for result in join_all(casts).await {
        let response = result.context("Failed to send vote request")?;
        match response.status() {
            StatusCode::CREATED => outcome.successes += 1,
            StatusCode::CONFLICT => outcome.conflicts += 1,
            status => anyhow::bail!("Unexpected vote status: {}", status),
        }
    }

    Ok(outcome)
}

async fn fetch_students(client: &Client, base_url: &str) -> Result<Vec<Student>> {
    let students_url = format!("{}/api/students", base_url);
    client
        .get(&students_url)
        .send()
        .await
        .context("Failed to fetch students")?
        .error_for_status()
        .context("Student listing failed")?
        .json()
        .await
        .context("Failed to parse students")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("🚀 Starting load test against {}", args.url);
    println!("👥 Voters: {}", args.voters);
    println!("⚡ Concurrency: {}", args.concurrency);
    println!("🔁 Attempts per voter: {}", args.attempts_per_voter);

    let setup_client = Client::new();

    // 0. Snapshot the leaderboard; seed an entry if the board is empty
    let mut students = fetch_students(&setup_client, &args.url).await?;
    if students.is_empty() {
        println!("📝 No students found, submitting one");
        setup_client
            .post(format!("{}/api/students", args.url))
            .json(&HashMap::from([(
                "name",
                format!("LoadTestStudent_{}", random_tag()),
            )]))
            .send()
            .await
            .context("Failed to submit student")?
            .error_for_status()
            .context("Student submission failed")?;
        students = fetch_students(&setup_client, &args.url).await?;
    }
    println!("📋 Found {} students", students.len());

    let before: HashMap<String, i32> = students
        .iter()
        .map(|s| (s.id.clone(), s.vote_count))
        .collect();

    let students = Arc::new(students);
    let base_url = Arc::new(args.url.clone());

    let success_count = Arc::new(AtomicUsize::new(0));
    let conflict_count = Arc::new(AtomicUsize::new(0));
    let violation_count = Arc::new(AtomicUsize::new(0));
    let failure_count = Arc::new(AtomicUsize::new(0));

    let pb = ProgressBar::new(args.voters as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let start_time = Instant::now();
    let attempts = args.attempts_per_voter;

    let results = stream::iter(0..args.voters)
        .map(|i| {
            let base_url = base_url.clone();
            let students = students.clone();
            let success_count = success_count.clone();
            let conflict_count = conflict_count.clone();
            let violation_count = violation_count.clone();
            let failure_count = failure_count.clone();
            let pb = pb.clone();

            async move {
                // A dedicated client per voter keeps connections honest
                let client = Client::new();

                match run_voter_simulation(&client, &base_url, i, attempts, &students).await {
                    Ok(outcome) => {
                        success_count.fetch_add(outcome.successes, Ordering::Relaxed);
                        conflict_count.fetch_add(outcome.conflicts, Ordering::Relaxed);
                        if outcome.successes != 1 {
                            violation_count.fetch_add(1, Ordering::Relaxed);
                        }
                        pb.set_message(format!(
                            "Votes: {}",
                            success_count.load(Ordering::Relaxed)
                        ));
                    }
                    Err(_e) => {
                        failure_count.fetch_add(1, Ordering::Relaxed);
                        pb.set_message(format!(
                            "Errors: {}",
                            failure_count.load(Ordering::Relaxed)
                        ));
                    }
                }
                pb.inc(1);
            }
        })
        .buffer_unordered(args.concurrency)
        .collect::<Vec<()>>();

    results.await;

    pb.finish_with_message("Done");

    // Cross-check: the leaderboard delta must equal the accepted votes
    let after = fetch_students(&setup_client, &args.url).await?;
    let counted: i64 = after
        .iter()
        .map(|s| {
            let old = before.get(&s.id).copied().unwrap_or(0);
            (s.vote_count - old) as i64
        })
        .sum();

    let duration = start_time.elapsed();
    let successes = success_count.load(Ordering::Relaxed);
    let conflicts = conflict_count.load(Ordering::Relaxed);
    let violations = violation_count.load(Ordering::Relaxed);
    let failures = failure_count.load(Ordering::Relaxed);
    let rps = successes as f64 / duration.as_secs_f64();

    println!("\n📊 Results:");
    println!("   Time taken: {:?}", duration);
    println!("   Voters simulated: {}", args.voters);
    println!("   Accepted votes: {}", successes);
    println!("   Rejected duplicates: {}", conflicts);
    println!("   Voter errors: {}", failures);
    println!("   Throughput: {:.2} votes/sec", rps);
    println!("   Leaderboard delta: {}", counted);

    if violations > 0 {
        anyhow::bail!(
            "❌ One-vote invariant violated for {} voter(s)",
            violations
        );
    }
    if counted != successes as i64 {
        anyhow::bail!(
            "❌ Leaderboard delta {} does not match accepted votes {}",
            counted,
            successes
        );
    }
    println!("✅ One vote per voter held; counters match the accepted votes");

    Ok(())
}
