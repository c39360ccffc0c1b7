// EduScan CLI binary

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eduscan::config::ScanConfig;
use eduscan::constants::DB_FILENAME;
use eduscan::db::{open_db, schema};
use eduscan::error::EduscanError;
use eduscan::metadata::ffprobe;
use eduscan::report;
use eduscan::scan::{store_outcome, Scanner};

#[derive(Parser)]
#[command(name = "eduscan")]
#[command(about = "Scan educational video libraries and catalog their metadata", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan library roots and store resolved metadata
    Scan {
        /// Library root directories to scan
        #[arg(required = true)]
        roots: Vec<PathBuf>,
        /// Path to the catalog database
        #[arg(long, default_value = DB_FILENAME)]
        db: PathBuf,
        /// Clear the database before scanning
        #[arg(long)]
        clear: bool,
        /// Skip embedded tag extraction (faster on slow storage)
        #[arg(long)]
        skip_tags: bool,
        /// Let a lesson claim any unclaimed descriptor in its directory
        /// when no exact-stem descriptor exists
        #[arg(long)]
        flexible_descriptors: bool,
    },

    /// List cataloged courses
    List {
        /// Path to the catalog database
        #[arg(long, default_value = DB_FILENAME)]
        db: PathBuf,
    },

    /// Show a course with its lessons and per-field provenance
    Show {
        /// Course ID
        id: i64,
        /// Path to the catalog database
        #[arg(long, default_value = DB_FILENAME)]
        db: PathBuf,
    },

    /// Show catalog statistics
    Stats {
        /// Path to the catalog database
        #[arg(long, default_value = DB_FILENAME)]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eduscan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { roots, db, clear, skip_tags, flexible_descriptors } => {
            cmd_scan(roots, db, clear, skip_tags, flexible_descriptors)
        }
        Commands::List { db } => cmd_list(db),
        Commands::Show { id, db } => cmd_show(id, db),
        Commands::Stats { db } => cmd_stats(db),
    }
}

fn cmd_scan(
    roots: Vec<PathBuf>,
    db: PathBuf,
    clear: bool,
    skip_tags: bool,
    flexible_descriptors: bool,
) -> Result<()> {
    let mut config = ScanConfig::new(roots);
    config.skip_embedded_tags = skip_tags;
    config.flexible_descriptors = flexible_descriptors;

    if !config.skip_embedded_tags && !ffprobe::is_available() {
        println!("ffprobe not found on PATH; embedded tag extraction disabled");
        config.skip_embedded_tags = true;
    }

    let conn = open_db(&db)?;
    if clear {
        println!("Clearing database...");
        schema::clear_all(&conn)?;
    }

    for root in &config.library_roots {
        println!("Scanning: {}", root.display());
    }
    println!("{}", "-".repeat(80));

    let start = std::time::Instant::now();
    let outcome = Scanner::new(config).run()?;
    let elapsed = start.elapsed();

    if outcome.courses.is_empty() {
        println!("No courses found (scanned in {:.2}s)", elapsed.as_secs_f64());
    } else {
        println!(
            "Found {} courses in {:.2}s",
            outcome.courses.len(),
            elapsed.as_secs_f64()
        );

        println!("\nStoring in database...");
        let stored = store_outcome(&conn, &outcome)?;
        println!("Stored {} courses", stored);

        for course in &outcome.courses {
            print!("{}", report::render_course(course));
        }
        print!("{}", report::render_summary(&outcome));

        let stats = schema::get_statistics(&conn)?;
        print!("{}", report::render_statistics(&stats));
    }

    print!("{}", report::render_warnings(&outcome));

    Ok(())
}

fn cmd_list(db: PathBuf) -> Result<()> {
    let conn = open_db(&db)?;
    let courses = schema::list_courses(&conn)?;

    if courses.is_empty() {
        println!("No courses cataloged. Use 'eduscan scan <roots...>' to scan a library.");
        return Ok(());
    }

    println!("{:>5}  {:>7}  {:>6}  {:>15}  {}", "ID", "Lessons", "Year", "Source", "Name");
    println!("{}", "-".repeat(70));

    for course in courses {
        let lessons = schema::count_lessons(&conn, course.id)?;
        println!(
            "{:>5}  {:>7}  {:>6}  {:>15}  {}",
            course.id,
            lessons,
            course.year.as_deref().unwrap_or("-"),
            course.metadata_source.as_deref().unwrap_or("-"),
            course.name
        );
    }

    Ok(())
}

fn cmd_show(id: i64, db: PathBuf) -> Result<()> {
    let conn = open_db(&db)?;

    let course = schema::get_course(&conn, id)?.ok_or(EduscanError::CourseNotFound(id))?;

    println!("Course #{}", course.id);
    println!();
    println!("Name:        {}", course.name);
    println!("Directory:   {}", course.directory_path);
    if let Some(ref description) = course.description {
        println!("Description: {}", description);
    }
    if let Some(ref instructor) = course.instructor {
        println!("Instructor:  {}", instructor);
    }
    if let Some(ref year) = course.year {
        println!("Year:        {}", year);
    }
    if let Some(ref source) = course.metadata_source {
        println!("Source:      {}", source);
    }

    let provenance = schema::course_provenance(&conn, course.id)?;
    if !provenance.is_empty() {
        println!();
        println!("Field provenance:");
        for entry in provenance {
            println!("  {:<12} {}", entry.field, entry.source);
        }
    }

    let lessons = schema::list_lessons(&conn, course.id)?;
    println!();
    println!("Lessons ({}):", lessons.len());

    for lesson in lessons {
        let duration = lesson
            .duration_seconds
            .map(report::format_duration)
            .unwrap_or_else(|| "Unknown".to_string());
        println!(
            "  [{}] {}  ({}, {})",
            lesson.id,
            lesson.title.as_deref().unwrap_or("[NO TITLE]"),
            duration,
            lesson.metadata_source.as_deref().unwrap_or("none"),
        );

        let provenance = schema::lesson_provenance(&conn, lesson.id)?;
        for entry in provenance {
            println!("      {:<12} {}", entry.field, entry.source);
        }
    }

    Ok(())
}

fn cmd_stats(db: PathBuf) -> Result<()> {
    let conn = open_db(&db)?;
    let stats = schema::get_statistics(&conn)?;
    print!("{}", report::render_statistics(&stats));
    Ok(())
}
