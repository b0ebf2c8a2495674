//! # CLI Command Implementations
//!
//! Each command loads the working snapshot, applies at most one mutation,
//! prints its report and writes the snapshot back when it changed.

use crate::api;
use convalida_core::{
    ConvalidaError, CourseCode, PlanSide, Session, audit, group_by_term,
    primitives::MAX_SNAPSHOT_SIZE, snapshot_checksum,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Reject files over the snapshot size limit before reading them.
fn validate_file_size(path: &Path) -> Result<(), ConvalidaError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ConvalidaError::IoError(format!("Cannot read file metadata: {}", e)))?;

    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > MAX_SNAPSHOT_SIZE {
        return Err(ConvalidaError::SnapshotTooLarge {
            size,
            max: MAX_SNAPSHOT_SIZE,
        });
    }
    Ok(())
}

/// Canonicalize an input path and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ConvalidaError> {
    let canonical = path.canonicalize().map_err(|e| {
        ConvalidaError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ConvalidaError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent directory of an output path.
fn validate_output_path(path: &Path) -> Result<PathBuf, ConvalidaError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ConvalidaError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ConvalidaError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ConvalidaError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &impl Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server over the working snapshot.
///
/// Mutations made through the API stay in memory; use `GET /snapshot` to
/// save them.
pub async fn cmd_server(snapshot: &Path, host: &str, port: u16) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;

    println!("Convalida server starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Snapshot: {}", snapshot.display());
    println!();
    println!("Endpoints:");
    println!("  GET  /health              - Health check");
    println!("  GET  /resolution          - Satisfied, partial and pending courses");
    println!("  GET  /progress            - Per-category progress");
    println!("  GET  /plans/{{side}}        - Term-grouped curriculum");
    println!("  POST /completions/toggle  - Flip a completion mark");
    println!("  POST /completions/reset   - Clear completion marks");
    println!("  PUT  /plans/{{side}}        - Replace a curriculum");
    println!("  PUT  /rules               - Replace the rule set");
    println!("  GET  /snapshot            - Export");
    println!("  POST /snapshot            - Import");
    println!("  GET  /audit               - Data-quality findings");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, session).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show recognition KPIs.
pub fn cmd_status(snapshot: &Path, json_mode: bool) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;
    let resolution = session.resolution();
    let progress = session.progress();
    let store = session.store();

    if json_mode {
        print_json(&serde_json::json!({
            "snapshot": snapshot.to_string_lossy(),
            "origin": store.origin().name,
            "destination": store.destination().name,
            "rules": store.rules().len(),
            "completed": session.completed().len(),
            "recognized": resolution.recognized_count(),
            "pending": resolution.pending_count(),
            "partials": resolution.partials.len(),
            "earned_credits": resolution.earned_credits,
            "total_credits": progress.total(),
            "percent": progress.percent()
        }));
        return Ok(());
    }

    println!("Convalida Status");
    println!("================");
    println!("Snapshot:    {}", snapshot.display());
    println!("Origin:      {}", store.origin().name);
    println!("Destination: {}", store.destination().name);
    println!("Rules:       {}", store.rules().len());
    println!();
    println!("Completed:   {}", session.completed().len());
    println!("Recognized:  {}", resolution.recognized_count());
    println!("Pending:     {}", resolution.pending_count());
    println!("Partial:     {}", resolution.partials.len());
    println!(
        "Credits:     {} / {} SCT ({}%)",
        resolution.earned_credits,
        progress.total(),
        progress.percent()
    );

    Ok(())
}

// =============================================================================
// TOGGLE / RESET COMMANDS
// =============================================================================

/// Flip the completion mark of each code, in argument order.
pub fn cmd_toggle(snapshot: &Path, json_mode: bool, codes: &[String]) -> Result<(), ConvalidaError> {
    let mut session = load_or_create_session(snapshot)?;

    let mut changes = Vec::with_capacity(codes.len());
    for raw in codes {
        let code = CourseCode::new(raw.trim());
        if !session.store().origin().contains(&code) {
            tracing::warn!("{} is not in the origin curriculum", code);
        }
        let completed = session.toggle(code.clone());
        tracing::info!(code = %code, completed, "toggle");
        changes.push((code, completed));
    }

    save_session(&session, snapshot)?;

    let resolution = session.resolution();
    if json_mode {
        let toggled: Vec<_> = changes
            .iter()
            .map(|(code, completed)| serde_json::json!({ "code": code, "completed": completed }))
            .collect();
        print_json(&serde_json::json!({
            "toggled": toggled,
            "recognized": resolution.recognized_count(),
            "earned_credits": resolution.earned_credits
        }));
        return Ok(());
    }

    for (code, completed) in &changes {
        let mark = if *completed { "completed" } else { "not completed" };
        println!("{}: {}", code, mark);
    }
    println!(
        "Recognized: {} ({} SCT)",
        resolution.recognized_count(),
        resolution.earned_credits
    );

    Ok(())
}

/// Clear every completion mark.
pub fn cmd_reset(snapshot: &Path) -> Result<(), ConvalidaError> {
    let mut session = load_or_create_session(snapshot)?;
    let cleared = session.completed().len();
    session.reset_all();
    tracing::info!(cleared, "reset");
    save_session(&session, snapshot)?;

    println!("Cleared {} completion marks", cleared);
    Ok(())
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// List satisfied, partial and pending destination courses.
pub fn cmd_resolve(snapshot: &Path, json_mode: bool) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;
    let resolution = session.resolution();

    if json_mode {
        print_json(resolution);
        return Ok(());
    }

    let destination = session.store().destination();
    let describe = |code: &CourseCode| match destination.course(code) {
        Some(course) => format!("{} {} ({} SCT)", code, course.name, course.credits),
        None => format!("{} (not in destination curriculum)", code),
    };

    println!("Recognized ({})", resolution.recognized_count());
    for code in &resolution.satisfied {
        println!("  [x] {}", describe(code));
    }

    if !resolution.partials.is_empty() {
        println!();
        println!("Partial ({})", resolution.partials.len());
        for partial in &resolution.partials {
            println!(
                "  [~] {} {}% via {} {}",
                describe(&partial.code),
                partial.coverage,
                partial.rule_id,
                partial.note
            );
        }
    }

    println!();
    println!("Pending ({})", resolution.pending_count());
    for code in &resolution.unsatisfied {
        println!("  [ ] {}", describe(code));
    }

    println!();
    println!("Earned: {} SCT", resolution.earned_credits);
    Ok(())
}

// =============================================================================
// PROGRESS COMMAND
// =============================================================================

/// Per-category credit progress.
pub fn cmd_progress(snapshot: &Path, json_mode: bool) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;
    let report = session.progress();

    if json_mode {
        let categories: Vec<_> = report
            .categories
            .iter()
            .map(|c| {
                serde_json::json!({
                    "category": c.category,
                    "earned": c.earned,
                    "total": c.total,
                    "percent": c.percent()
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "categories": categories,
            "earned": report.earned(),
            "total": report.total(),
            "percent": report.percent()
        }));
        return Ok(());
    }

    println!("Progress: {}", session.store().destination().name);
    println!();
    for c in &report.categories {
        println!(
            "  {:<8} {:>4} / {:<4} SCT  {:>3}%",
            c.category.as_str(),
            c.earned,
            c.total,
            c.percent()
        );
    }
    println!();
    println!(
        "  {:<8} {:>4} / {:<4} SCT  {:>3}%",
        "TOTAL",
        report.earned(),
        report.total(),
        report.percent()
    );
    Ok(())
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Term-grouped listing with completion (origin) or recognition (destination) marks.
pub fn cmd_plan(snapshot: &Path, json_mode: bool, side: PlanSide) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;
    let curriculum = session.store().curriculum(side);
    let groups = group_by_term(curriculum);

    if json_mode {
        print_json(&serde_json::json!({
            "side": side,
            "id": curriculum.id,
            "name": curriculum.name,
            "terms": groups
        }));
        return Ok(());
    }

    let resolution = session.resolution();
    println!("{} ({})", curriculum.name, side);

    for group in &groups {
        println!();
        println!("{} - {} SCT", group.term, group.credits());
        for course in &group.courses {
            let mark = match side {
                PlanSide::Origin if session.is_completed(&course.code) => "[x]",
                PlanSide::Destination if resolution.is_satisfied(&course.code) => "[x]",
                PlanSide::Destination if resolution.partials_for(&course.code).next().is_some() => {
                    "[~]"
                }
                _ => "[ ]",
            };
            println!(
                "  {} {:<12} {:<50} {:<6} {:>2} SCT",
                mark,
                course.code.as_str(),
                course.name,
                course.category.as_str(),
                course.credits
            );
        }
    }
    Ok(())
}

// =============================================================================
// IMPORT / EXPORT COMMANDS
// =============================================================================

/// Import a snapshot file into the working snapshot.
///
/// Fields absent from the file keep their current value. On a parse failure
/// the working snapshot is not touched.
pub fn cmd_import(snapshot: &Path, input: &Path) -> Result<(), ConvalidaError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| ConvalidaError::IoError(format!("Read file: {}", e)))?;

    let mut session = load_or_create_session(snapshot)?;
    if let Err(e) = session.import_snapshot(&data) {
        tracing::warn!("Import of {} rejected: {}", validated_path.display(), e);
        return Err(e);
    }
    tracing::info!("Imported {}", validated_path.display());
    log_audit(&session);

    save_session(&session, snapshot)?;

    println!(
        "Imported: {} origin courses, {} destination courses, {} rules, {} completed",
        session.store().origin().len(),
        session.store().destination().len(),
        session.store().rules().len(),
        session.completed().len()
    );
    Ok(())
}

/// Export the working snapshot.
pub fn cmd_export(snapshot: &Path, output: &Path) -> Result<(), ConvalidaError> {
    let validated_output = validate_output_path(output)?;

    let session = load_or_create_session(snapshot)?;
    let data = session.export_snapshot().to_json_bytes()?;

    std::fs::write(&validated_output, &data)
        .map_err(|e| ConvalidaError::IoError(format!("Write file: {}", e)))?;

    println!(
        "Exported {} bytes to {}",
        data.len(),
        validated_output.display()
    );
    Ok(())
}

// =============================================================================
// CHECK / HASH COMMANDS
// =============================================================================

/// Print data-quality findings. Findings are advisory; the command succeeds.
pub fn cmd_check(snapshot: &Path, json_mode: bool) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;
    let issues = audit(session.store());

    if json_mode {
        print_json(&serde_json::json!({ "issues": issues }));
        return Ok(());
    }

    if issues.is_empty() {
        println!("No issues found");
        return Ok(());
    }

    println!("{} issue(s) found", issues.len());
    for issue in &issues {
        println!("  - {}", issue);
    }
    Ok(())
}

/// Compute the BLAKE3 digest of the exported snapshot.
pub fn cmd_hash(snapshot: &Path, json_mode: bool) -> Result<(), ConvalidaError> {
    let session = load_or_create_session(snapshot)?;
    let checksum = snapshot_checksum(&session.export_snapshot())?;

    if json_mode {
        print_json(&serde_json::json!({
            "algorithm": "blake3",
            "hash": checksum
        }));
    } else {
        println!("BLAKE3: {}", checksum);
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write the built-in sample to the working snapshot.
pub fn cmd_init(snapshot: &Path, force: bool) -> Result<(), ConvalidaError> {
    if snapshot.exists() && !force {
        return Err(ConvalidaError::IoError(format!(
            "Snapshot '{}' already exists. Use --force to overwrite.",
            snapshot.display()
        )));
    }

    let session = Session::sample()?;
    save_session(&session, snapshot)?;

    println!(
        "Initialized {} -> {} sample at {}",
        session.store().origin().name,
        session.store().destination().name,
        snapshot.display()
    );
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load the working snapshot, or the built-in sample when the file is missing.
pub fn load_or_create_session(snapshot: &Path) -> Result<Session, ConvalidaError> {
    if !snapshot.exists() {
        tracing::info!(
            "No snapshot at {}, using the built-in sample",
            snapshot.display()
        );
        return Session::sample();
    }

    validate_file_size(snapshot)?;
    let data = std::fs::read(snapshot)
        .map_err(|e| ConvalidaError::IoError(format!("Read snapshot: {}", e)))?;

    let mut session = Session::new();
    session.import_snapshot(&data).inspect_err(|e| {
        tracing::warn!("Snapshot {} could not be loaded: {}", snapshot.display(), e);
    })?;
    tracing::debug!(
        completed = session.completed().len(),
        "Loaded snapshot {}",
        snapshot.display()
    );
    for issue in audit(session.store()) {
        tracing::debug!("Data issue: {}", issue);
    }
    Ok(session)
}

/// Write the session to a snapshot file.
///
/// The bytes go to a temporary file in the same directory, which is then
/// renamed over the target. A failed write leaves the previous file intact.
pub fn save_session(session: &Session, snapshot: &Path) -> Result<(), ConvalidaError> {
    let data = session.export_snapshot().to_json_bytes()?;
    let dir = match snapshot.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ConvalidaError::IoError(format!("Create temp snapshot: {}", e)))?;
    file.write_all(&data)
        .map_err(|e| ConvalidaError::IoError(format!("Write snapshot: {}", e)))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ConvalidaError::IoError(format!("Sync snapshot: {}", e)))?;
    file.persist(snapshot)
        .map_err(|e| ConvalidaError::IoError(format!("Replace snapshot: {}", e)))?;
    Ok(())
}

/// Log every audit finding at warn level.
pub fn log_audit(session: &Session) {
    for issue in audit(session.store()) {
        tracing::warn!("Data issue: {}", issue);
    }
}
