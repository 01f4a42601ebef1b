mod logger;

use std::process;

use anyhow::{bail, Context};
use avl_arena::arena::Key;
use avl_arena::avl_tree::Default;
use clap::{ArgAction, Parser, Subcommand};
use itertools::Itertools;
use rand::prelude::*;
use rand_pcg::Pcg64;

#[derive(Debug, Parser)]
#[clap(version)]
struct Cli {
    #[clap(subcommand)]
    cmd: Command,
    /// Enables verbose logging; repeat for more
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the rotation scenarios and prints every traversal
    Demo,
    /// Inserts the given keys, then deletes the given keys, and prints the result
    Run {
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        insert: Vec<Key>,
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        delete: Vec<Key>,
    },
    /// Random inserts and deletes, validating the tree after every step
    Random {
        #[clap(long, default_value_t = 10_000)]
        count: usize,
        #[clap(long, env = "AVL_SEED", default_value_t = 54783)]
        seed: u64,
        /// Keys are drawn from `0..key_range`
        #[clap(long, default_value_t = 512)]
        key_range: Key,
    },
}

fn print_orders(tree: &Default) {
    println!("  in-order:    {}", tree.in_order().join(", "));
    println!("  pre-order:   {}", tree.pre_order().join(", "));
    println!("  post-order:  {}", tree.post_order().join(", "));
    println!("  level-order: {}", tree.level_order().join(", "));
    println!("  height:      {}", tree.height());
}

fn check(tree: &Default, context: &str) -> anyhow::Result<()> {
    if let Err(violations) = tree.validate() {
        bail!(
            "{context}: {}",
            violations.iter().map(|v| v.to_string()).join("; ")
        );
    }
    Ok(())
}

fn scenario(name: &str, inserts: &[Key], deletes: &[Key]) -> anyhow::Result<()> {
    println!("\n{name}");
    let mut tree = Default::from_keys(inserts.iter().copied())?;
    for &key in deletes {
        tree.delete(key);
        check(&tree, &format!("{name}, after deleting {key}"))?;
    }
    print_orders(&tree);
    print!("{tree}");
    Ok(())
}

fn demo() -> anyhow::Result<()> {
    scenario("balanced insert", &[50, 30, 70, 20, 40, 60, 80], &[])?;
    scenario("delete root", &[50, 30, 70, 20, 40, 60, 80], &[50])?;
    scenario("LL on insert, then delete 80", &[50, 30, 70, 20, 60, 80, 10], &[80])?;
    scenario("LR on insert, then delete 70", &[50, 30, 70, 20, 40, 45], &[70])?;
    scenario("LL on delete 17", &[10, 15, 5, 17, 7, 3, 8, 1], &[17])?;
    scenario("LR on delete 80", &[50, 30, 70, 20, 40, 80, 35], &[80])?;
    scenario("RR on delete 3", &[10, 5, 20, 3, 15, 25, 12, 30], &[3])?;
    scenario("RL on delete 20", &[50, 30, 70, 20, 60, 80, 65], &[20])?;

    let mut tree = Default::from_keys(1..=100)?;
    for key in (1..=100).rev() {
        tree.delete(key);
        check(&tree, &format!("descending deletes, key {key}"))?;
    }
    println!("\ninsert 1..=100, delete descending");
    println!("  empty: {}, live nodes: {}", tree.is_empty(), tree.len());
    Ok(())
}

fn random(count: usize, seed: u64, key_range: Key) -> anyhow::Result<()> {
    if key_range <= 0 {
        bail!("key range must be positive, got {key_range}");
    }
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut tree = Default::with_capacity(key_range as usize);
    let (mut inserted, mut deleted) = (0usize, 0usize);
    for step in 0..count {
        let key = rng.random_range(0..key_range);
        if rng.random_bool(0.6) {
            if tree.insert(key).context("random insert")? {
                inserted += 1;
            }
        } else if tree.delete(key) {
            deleted += 1;
        }
        check(&tree, &format!("step {step}"))?;
    }
    log::info!("seed {seed}: {inserted} inserts, {deleted} deletes");
    println!(
        "{count} operations ok: {} keys, height {}",
        tree.len(),
        tree.height()
    );
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("{:?}", err);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.cmd {
        Command::Demo => demo(),
        Command::Run { insert, delete } => {
            let mut tree = Default::from_keys(insert)?;
            for key in delete {
                if !tree.delete(key) {
                    log::warn!("{key} not in tree");
                }
            }
            check(&tree, "run")?;
            print_orders(&tree);
            print!("{tree}");
            Ok(())
        }
        Command::Random {
            count,
            seed,
            key_range,
        } => random(count, seed, key_range),
    }
}
