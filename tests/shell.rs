//! End-to-end sessions against SQLite, fed the way stdin would be.
use dbshell::engine::sqlite::SqliteConnection;
use dbshell::engine::{Connection, Engine, Sqlite};
use dbshell::error::Result;
use dbshell::shell::reader::Lines;
use dbshell::shell::{State, Summary};
use dbshell::Shell;

/// Runs a session over the given input against an in-memory database set up with the given
/// statements, returning the summary, output and error stream.
fn session(setup: Vec<&str>, input: &str) -> Result<(Summary, String, String)> {
    let mut connection = Sqlite::memory().connect()?;
    for statement in setup {
        connection.execute(statement)?;
    }
    let mut shell = Shell::new(connection, Vec::new(), Vec::new());
    let summary = shell.run(&mut Lines::new(input.as_bytes()))?;
    assert_eq!(shell.state(), State::Terminated);
    Ok((
        summary,
        String::from_utf8_lossy(shell.output()).into_owned(),
        String::from_utf8_lossy(shell.errors()).into_owned(),
    ))
}

#[test]
fn select_two_rows() -> Result<()> {
    let (summary, output, errors) = session(
        vec!["create table t (a int, b text)", "insert into t values (1, 'one'), (2, 'two')"],
        "select * from t\n;\n;\n",
    )?;
    assert_eq!(
        output,
        "<table>\n\
         \t<caption>select * from t</caption>\n\
         \t<tr><th>a</th><th>b</th></tr>\n\
         \t<tr><td>1</td><td>one</td></tr>\n\
         \t<tr><td>2</td><td>two</td></tr>\n\
         </table>\n"
    );
    assert_eq!(errors, "");
    assert_eq!(summary, Summary { executed: 1, failed: 0 });
    Ok(())
}

#[test]
fn create_then_empty_select() -> Result<()> {
    let (summary, output, errors) =
        session(vec![], "create table t (a int);\n;\nselect * from t;\n;\n;\n")?;
    assert_eq!(
        output,
        "<table>\n\t<caption>select * from t;</caption>\n\t<tr><th>a</th></tr>\n</table>\n"
    );
    assert_eq!(errors, "");
    assert_eq!(summary, Summary { executed: 2, failed: 0 });
    Ok(())
}

#[test]
fn error_then_statement() -> Result<()> {
    let input = "insert into missing values (1)\n;\n\
                 create table t (a int)\n;\n\
                 insert into t values (5)\n;\n\
                 select a from t\n;\n;\n";
    let (summary, output, errors) = session(vec![], input)?;
    assert_eq!(summary, Summary { executed: 3, failed: 1 });
    assert_eq!(errors.lines().count(), 1);
    assert!(errors.contains("no such table: missing"));
    assert!(output.contains("\t<tr><td>5</td></tr>\n"));
    Ok(())
}

#[test]
fn multi_line_statement() -> Result<()> {
    let input = "select\n\n  1 as x,\n'y'\n  as y\n;\n;\n";
    let (_, output, _) = session(vec![], input)?;
    assert!(output.contains("<caption>select   1 as x, 'y'   as y</caption>"));
    assert!(output.contains("\t<tr><th>x</th><th>y</th></tr>\n\t<tr><td>1</td><td>y</td></tr>\n"));
    Ok(())
}

#[test]
fn end_of_input_runs_pending_statement() -> Result<()> {
    let (summary, output, _) = session(vec![], "SELECT 2 AS two")?;
    assert_eq!(summary, Summary { executed: 1, failed: 0 });
    assert!(output.contains("<tr><th>two</th></tr>"));
    assert!(output.contains("<td>2</td>"));
    Ok(())
}

#[test]
fn bare_terminator_ends_session() -> Result<()> {
    let (summary, output, errors) = session(vec![], ";\ncreate table t (a int)\n;\n")?;
    assert_eq!(summary, Summary::default());
    assert_eq!(output, "");
    assert_eq!(errors, "");
    Ok(())
}

#[test]
fn values_use_driver_strings() -> Result<()> {
    let (_, output, _) = session(vec![], "select null, 1.5, 2.0, x'c0ff', '<i>'\n;\n;\n")?;
    assert!(output.contains("<tr><td>null</td><td>1.5</td><td>2.0</td><td>c0ff</td><td><i></td></tr>"));
    Ok(())
}

#[test]
fn on_disk_database_persists() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("res").join("rootdb.db");

    let connection: SqliteConnection = Sqlite::new(&path, true).connect()?;
    let mut shell = Shell::new(connection, Vec::new(), Vec::new());
    shell.run(&mut Lines::new("create table t (a int)\n;\ninsert into t values (3)\n;\n;\n".as_bytes()))?;
    drop(shell);

    let connection = Sqlite::new(&path, false).connect()?;
    let mut shell = Shell::new(connection, Vec::new(), Vec::new());
    shell.run(&mut Lines::new("select a from t\n;\n".as_bytes()))?;
    assert!(String::from_utf8_lossy(shell.output()).contains("<td>3</td>"));
    Ok(())
}

#[test]
fn multiple_statements_rejected() -> Result<()> {
    let input = "create table a (x int); create table b (y int)\n;\n\
                 select * from b\n;\n\
                 select 1; select 2\n;\n\
                 select 3;\n;\n;\n";
    let (summary, output, errors) = session(vec![], input)?;
    assert_eq!(summary, Summary { executed: 1, failed: 3 });
    let errors = errors.lines().collect::<Vec<_>>();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0], "Only one SQL statement can be run at a time");
    assert!(errors[1].contains("no such table: b"));
    assert_eq!(errors[2], "Only one SQL statement can be run at a time");
    assert!(!output.contains("select 1; select 2"));
    assert!(output.contains("<caption>select 3;</caption>"));
    Ok(())
}

#[test]
fn unreadable_value_leaves_cell_empty() -> Result<()> {
    let (summary, output, errors) =
        session(vec![], "select 1 as a, cast(x'ff' as text) as b, 3 as c\n;\nselect 4\n;\n;\n")?;
    assert_eq!(summary, Summary { executed: 2, failed: 0 });
    assert!(output.contains("\t<tr><th>a</th><th>b</th><th>c</th></tr>\n\t<tr><td>1</td><td></td><td>3</td></tr>\n</table>\n"));
    assert!(output.contains("<td>4</td>"));
    assert_eq!(errors.lines().count(), 1);
    assert!(errors.contains("invalid utf-8"));
    Ok(())
}
