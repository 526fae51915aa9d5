use anyhow::Result;
use needproperty::{query, BaseEntity, Catalog, ConditionTree, FilterCompiler};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const CATALOG_FILE: &str = "catalog.json";

/// Sample requirement document: distro scope.
const SAMPLE_DISTRO: &str = r#"{
    "name": "distro",
    "children": [
        {"name": "and", "children": [
            {"name": "distro_arch", "attributes": {"op": "=", "value": "x86_64"}},
            {"name": "distro_family", "attributes": {"op": "=", "value": "Fedora"}},
            {"name": "distro_tag", "attributes": {"op": "=", "value": "RELEASED"}}
        ]}
    ]
}"#;

/// Sample requirement document: host scope, with a self-joined key/value pair.
const SAMPLE_HOST: &str = r#"{
    "name": "host",
    "children": [
        {"name": "and", "children": [
            {"name": "key_value", "attributes": {"key": "CPUFLAGS", "op": "==", "value": "vmx"}},
            {"name": "key_value", "attributes": {"key": "MEMORY", "op": ">=", "value": "4096"}},
            {"name": "power"}
        ]}
    ]
}"#;

/// Load the column/table catalog, falling back to the built-in schema when no
/// configuration file is present.
fn load_catalog() -> Catalog {
    match Catalog::from_json_file(CATALOG_FILE) {
        Ok(catalog) => {
            println!("loaded catalog from {CATALOG_FILE}");
            catalog
        }
        Err(e) => {
            println!("using built-in catalog ({e})");
            Catalog::default()
        }
    }
}

fn compile_document(compiler: &FilterCompiler, source: &str) -> Result<()> {
    let tree: ConditionTree = serde_json::from_str(source)?;
    let entity = BaseEntity::of_root(tree.name());
    let filter = compiler.compile(&tree)?;

    println!("  root element : {}", tree.name());
    println!("  base entity  : {entity:?}");
    println!("  joins        : {}", filter.joins.len());
    for join in &filter.joins {
        println!("    {} AS {}", join.table, join.alias);
    }
    let select = query::apply(query::base_query(compiler.catalog(), entity), &filter);
    println!("  sql          : {}", query::render(&select));
    Ok(())
}

fn main() -> Result<()> {
    println!("--- needproperty: requirement document to SQL filter ---");

    let compiler = FilterCompiler::new(load_catalog());

    println!("\n[step 1] compiling the distro-selection document:");
    println!("{SAMPLE_DISTRO}");
    compile_document(&compiler, SAMPLE_DISTRO)?;

    println!("\n[step 2] compiling the host-selection document:");
    println!("{SAMPLE_HOST}");
    compile_document(&compiler, SAMPLE_HOST)?;

    println!("\n[step 3] interactive mode");
    println!("enter a requirement document as JSON (ctrl-d to quit):");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("needproperty> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                if let Err(e) = compile_document(&compiler, line) {
                    println!("error: {e}");
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("readline error: {e}");
                break;
            }
        }
    }

    Ok(())
}
