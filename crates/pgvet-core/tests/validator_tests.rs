// Integration tests for the validation pipeline
use pgvet_core::lexer::split_statements;
use pgvet_core::{
    validate_source, validate_sources, Category, Report, Severity, SourceFile,
};
use pretty_assertions::assert_eq;

fn count(report: &Report, category: Category, severity: Severity) -> usize {
    report
        .findings
        .iter()
        .filter(|f| f.category == category && f.severity == severity)
        .count()
}

fn codes(report: &Report) -> Vec<&'static str> {
    report.findings.iter().map(|f| f.code()).collect()
}

#[test]
fn test_idempotence() {
    let sql = r#"
        CREATE TABLE users (
            id uuid,
            email text NOT NULL,
            CONSTRAINT pk_users PRIMARY KEY (id)
        );
        ALTER TABLE users ENABLE ROW LEVEL SECURITY;
        CREATE POLICY users_select ON users FOR SELECT TO authenticated USING (id = auth.uid());
        CREATE INDEX idx_users_email ON users (email);
        CREATE INDEX idx_users_email_2 ON users (email);
    "#;
    let first = validate_source("schema.sql", sql);
    let second = validate_source("schema.sql", sql);
    assert_eq!(first, second);
}

#[test]
fn test_statement_boundary_in_string_literal() {
    let (stmts, findings) = split_statements("CREATE TABLE t (note TEXT DEFAULT 'a;b');");
    assert!(findings.is_empty());
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_rls_enabled_without_policy_is_an_error() {
    let report = validate_source("m.sql", "ALTER TABLE t ENABLE ROW LEVEL SECURITY;");
    assert_eq!(report.summary.errors, 1);
    assert_eq!(count(&report, Category::Rls, Severity::Error), 1);
    assert!(report.findings[0].message.contains("'t'"));
    assert!(report.has_errors());
}

#[test]
fn test_rls_error_removed_by_policy() {
    let report = validate_source(
        "m.sql",
        r#"
        ALTER TABLE t ENABLE ROW LEVEL SECURITY;
        CREATE POLICY t_read ON t FOR SELECT TO authenticated USING (true);
        "#,
    );
    assert_eq!(count(&report, Category::Rls, Severity::Error), 0);
    assert!(!report.has_errors());
}

#[test]
fn test_policies_without_rls_is_a_warning() {
    let report = validate_source(
        "m.sql",
        r#"
        CREATE TABLE notes (id uuid, CONSTRAINT pk_notes PRIMARY KEY (id));
        CREATE POLICY notes_read ON notes FOR SELECT TO authenticated USING (true);
        "#,
    );
    assert!(codes(&report).contains(&"RL002"));
    assert!(!report.has_errors());
}

#[test]
fn test_policy_shape_warnings() {
    let report = validate_source(
        "m.sql",
        r#"
        CREATE TABLE notes (id uuid, CONSTRAINT pk_notes PRIMARY KEY (id));
        ALTER TABLE notes ENABLE ROW LEVEL SECURITY;
        CREATE POLICY notes_write ON notes FOR INSERT TO authenticated;
        CREATE POLICY notes_read ON notes FOR SELECT USING (true);
        "#,
    );
    let codes = codes(&report);
    // INSERT policy without WITH CHECK, and a policy with no TO clause.
    assert!(codes.contains(&"RL004"));
    assert!(codes.contains(&"RL003"));
}

#[test]
fn test_missing_primary_key_is_an_error() {
    let report = validate_source("m.sql", "CREATE TABLE t (id uuid, name text);");
    assert_eq!(report.summary.errors, 1);
    assert_eq!(count(&report, Category::Constraints, Severity::Error), 1);
    assert!(report
        .findings
        .iter()
        .any(|f| f.code() == "CN001" && f.message.contains("'t'")));
}

#[test]
fn test_primary_key_removes_the_error() {
    let report = validate_source(
        "m.sql",
        "CREATE TABLE t (id uuid, name text, PRIMARY KEY (id));",
    );
    assert_eq!(count(&report, Category::Constraints, Severity::Error), 0);
}

#[test]
fn test_foreign_key_without_index_is_one_indexes_warning() {
    let report = validate_source("m.sql", "CREATE TABLE t (org_id uuid REFERENCES orgs(id));");
    assert_eq!(count(&report, Category::Indexes, Severity::Warning), 1);
    assert!(codes(&report).contains(&"IX001"));
}

#[test]
fn test_covering_index_removes_the_warning() {
    let report = validate_source(
        "m.sql",
        r#"
        CREATE TABLE t (org_id uuid REFERENCES orgs(id));
        CREATE INDEX idx_t_org_id ON t (org_id);
        "#,
    );
    assert_eq!(count(&report, Category::Indexes, Severity::Warning), 0);
}

#[test]
fn test_primary_key_counts_as_covering_index() {
    let report = validate_source(
        "m.sql",
        r#"
        CREATE TABLE members (
            user_id uuid REFERENCES users(id),
            CONSTRAINT pk_members PRIMARY KEY (user_id)
        );
        "#,
    );
    assert!(!codes(&report).contains(&"IX001"));
}

#[test]
fn test_redundant_index_warning() {
    let report = validate_source(
        "m.sql",
        r#"
        CREATE TABLE logs (id bigint, CONSTRAINT pk_logs PRIMARY KEY (id));
        CREATE INDEX idx_logs_id ON logs (id);
        CREATE INDEX idx_logs_id_again ON logs (id);
        "#,
    );
    assert!(codes(&report).contains(&"IX003"));
}

#[test]
fn test_naming_conventions() {
    let upper = validate_source("m.sql", r#"CREATE TABLE "Users" (id uuid, CONSTRAINT pk_users PRIMARY KEY (id));"#);
    assert!(codes(&upper).contains(&"NM001"));
    assert!(!codes(&upper).contains(&"NM002"));

    let singular = validate_source(
        "m.sql",
        "CREATE TABLE person (id uuid, CONSTRAINT pk_person PRIMARY KEY (id));",
    );
    assert!(codes(&singular).contains(&"NM002"));
    assert!(!codes(&singular).contains(&"NM001"));

    let plural = validate_source(
        "m.sql",
        "CREATE TABLE users (id uuid, CONSTRAINT pk_users PRIMARY KEY (id));",
    );
    assert!(!codes(&plural).contains(&"NM001"));
    assert!(!codes(&plural).contains(&"NM002"));
}

#[test]
fn test_reserved_identifier_warning() {
    let report = validate_source(
        "m.sql",
        r#"CREATE TABLE "user" (id uuid, "order" int, CONSTRAINT pk_user PRIMARY KEY (id));"#,
    );
    assert_eq!(count(&report, Category::Syntax, Severity::Warning), 2);
}

#[test]
fn test_constraint_name_prefix_conventions() {
    let report = validate_source(
        "m.sql",
        r#"
        CREATE TABLE orders (
            id bigint,
            user_id uuid,
            CONSTRAINT orders_pkey PRIMARY KEY (id),
            CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users (id)
        );
        CREATE INDEX orders_user_idx ON orders (user_id);
        "#,
    );
    let codes = codes(&report);
    // Mis-prefixed primary key and index names; the fk_ name passes.
    assert!(codes.contains(&"NM004"));
    assert!(codes.contains(&"NM006"));
}

#[test]
fn test_empty_check_is_an_error() {
    let report = validate_source(
        "m.sql",
        "CREATE TABLE t (id uuid, CONSTRAINT pk_t PRIMARY KEY (id), CONSTRAINT ck_t CHECK ());",
    );
    assert!(report
        .findings
        .iter()
        .any(|f| f.code() == "CN004" && f.severity == Severity::Error));
}

#[test]
fn test_unterminated_literal_flows_into_the_report() {
    let report = validate_source(
        "m.sql",
        "CREATE TABLE a (x text DEFAULT 'oops);\nCREATE TABLE b (id uuid, CONSTRAINT pk_b PRIMARY KEY (id));",
    );
    assert!(codes(&report).contains(&"SY001"));
    // Recovery still validates the statement after the bad one.
    assert!(report.findings.iter().all(|f| f.code() != "CN001"));
}

#[test]
fn test_batch_equals_concatenation() {
    let broken = SourceFile::new("001_broken.sql", "CREATE TABLE t (id uuid);");
    let clean = SourceFile::new(
        "002_clean.sql",
        "CREATE TABLE users (id uuid, CONSTRAINT pk_users PRIMARY KEY (id));",
    );

    let clean_alone = validate_source(&clean.name, &clean.contents);
    assert!(clean_alone.is_empty());

    let batch = validate_sources(&[broken.clone(), clean.clone()]);
    assert_eq!(batch.summary.errors, 1);
    assert!(batch.has_errors());

    let concatenated = Report::merge([
        validate_source(&broken.name, &broken.contents),
        clean_alone,
    ]);
    assert_eq!(batch, concatenated);
}

#[test]
fn test_findings_carry_file_and_line() {
    let report = validate_source("migrations/0001_init.sql", "\n\nCREATE TABLE t (id uuid);");
    let missing_pk = report
        .findings
        .iter()
        .find(|f| f.code() == "CN001")
        .unwrap();
    assert_eq!(missing_pk.file, "migrations/0001_init.sql");
    assert_eq!(missing_pk.line(), 3);
}
