//! Integration tests against the sample notebooks in `tests/notebooks/`

use nbkit_notebook::{
    get_errors, get_images, get_stream, load_notebook_file, load_script_file, markdownize,
    outline, parse_interactive, parse_percent, remove_markdown_cells, save_notebook_file,
    save_script_file, serialize_notebook, to_interactive, to_interactive_html, to_percent, Cell,
    CellType, LoadOptions, Notebook, NotebookError, Output, ScriptFormat, ScriptParser,
    StreamSelection,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("notebooks")
        .join(name)
}

fn load(name: &str) -> Notebook {
    load_notebook_file(fixture(name), &LoadOptions::default()).unwrap()
}

#[test]
fn test_load_hello_world() {
    let nb = load("hello-world.ipynb");
    assert_eq!(nb.version().to_string(), "4.5");
    let ids: Vec<&str> = nb.iter().map(Cell::id).collect();
    assert_eq!(ids, vec!["a9541506", "b777420a", "a23ab5ac"]);
    assert_eq!(nb.cells()[1].cell_type(), CellType::Code);
    assert_eq!(nb.metadata()["kernelspec"]["name"], "python3");
}

#[test]
fn test_serialize_reproduces_jupyter_layout() {
    for name in ["hello-world.ipynb", "minimal.ipynb", "errors.ipynb", "images.ipynb"] {
        let original = std::fs::read_to_string(fixture(name)).unwrap();
        let nb = load(name);
        assert_eq!(serialize_notebook(&nb).unwrap(), original, "{name}");
    }
}

#[test]
fn test_file_roundtrip_preserves_structure() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("copy.ipynb");
    let nb = load("streams.ipynb");
    save_notebook_file(&nb, &path).unwrap();
    let reloaded = load_notebook_file(&path, &LoadOptions::strict()).unwrap();
    assert_eq!(reloaded, nb);
}

#[test]
fn test_raw_cells_lenient_and_strict() {
    let lenient = load("streams.ipynb");
    assert_eq!(lenient.len(), 2);
    assert!(lenient.find_cell("r0").is_none());

    let strict = load_notebook_file(fixture("streams.ipynb"), &LoadOptions::strict());
    match strict {
        Err(NotebookError::UnsupportedCellType { cell_type, index }) => {
            assert_eq!(cell_type, "raw");
            assert_eq!(index, 2);
        }
        other => panic!("expected UnsupportedCellType, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_notebook_file(fixture("does-not-exist.ipynb"), &LoadOptions::default());
    assert!(matches!(result, Err(NotebookError::IoError(_))));
}

#[test]
fn test_streams() {
    let nb = load("streams.ipynb");
    assert_eq!(
        get_stream(&nb, StreamSelection::default()),
        "line 1\nline 2\nline 3\n"
    );
    assert_eq!(get_stream(&nb, StreamSelection::stderr()), "warning: careful\n");
    assert_eq!(
        get_stream(&nb, StreamSelection::both()),
        "line 1\nline 2\nwarning: careful\nline 3\n"
    );
}

#[test]
fn test_errors() {
    let nb = load("errors.ipynb");
    let errors = get_errors(&nb);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].cell_id, "e0");
    assert_eq!(errors[0].to_string(), "ZeroDivisionError: division by zero");
    assert_eq!(errors[1].cell_id, "e2");
    assert_eq!(errors[1].ename, "NameError");
    assert!(matches!(
        nb.cells()[1].as_code().unwrap().outputs[0],
        Output::ExecuteResult(_)
    ));
}

#[test]
fn test_images() {
    let nb = load("images.ipynb");
    let extraction = get_images(&nb);

    assert_eq!(extraction.images.len(), 2);
    let white = &extraction.images[0];
    assert_eq!(white.cell_id, "p0");
    assert_eq!(white.array.shape(), &[2, 2, 3]);
    assert!(white.array.iter().all(|&v| v == 255));

    let strip = &extraction.images[1];
    assert_eq!(strip.cell_id, "p1");
    assert_eq!(strip.array.shape(), &[1, 3, 4]);
    assert_eq!(strip.array[[0, 0, 0]], 255);
    assert_eq!(strip.array[[0, 1, 3]], 128);

    assert_eq!(extraction.failures.len(), 1);
    assert_eq!(extraction.failures[0].cell_id, "p2");
    assert_eq!(extraction.failures[0].output_index, 0);
}

#[test]
fn test_clear_outputs() {
    let mut nb = load("images.ipynb");
    nb.clear_outputs();
    assert!(nb
        .code_cells()
        .all(|c| c.outputs.is_empty() && c.execution_count.is_none()));
    assert!(get_images(&nb).images.is_empty());

    let text = serialize_notebook(&nb).unwrap();
    assert!(text.contains("\"execution_count\": null"));
    assert!(!text.contains("image/png"));
}

#[test]
fn test_percent_hello_world() {
    let nb = load("hello-world.ipynb");
    assert_eq!(
        to_percent(&nb),
        "# %% [markdown]\n\
         # Hello world!\n\
         # ============\n\
         # Print `Hello world!`:\n\
         \n\
         # %%\n\
         print(\"Hello world!\")\n\
         \n\
         # %% [markdown]\n\
         # Goodbye! 👋"
    );
    let parsed = parse_percent(&to_percent(&nb));
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.cells()[0].source(), nb.cells()[0].source());
}

#[test]
fn test_interactive_hello_world() {
    let nb = load("hello-world.ipynb");
    let text = to_interactive(&nb);
    assert!(text.starts_with("# %% [markdown]\nHello world!\n"));
    assert!(text.contains("\n\n# %% [python]\nprint(\"Hello world!\")\n\n"));

    let parsed = parse_interactive(&text);
    let types: Vec<CellType> = parsed.iter().map(Cell::cell_type).collect();
    assert_eq!(types, vec![CellType::Markdown, CellType::Code, CellType::Markdown]);
    for (a, b) in parsed.iter().zip(nb.iter()) {
        assert_eq!(a.source(), b.source());
    }

    let html = to_interactive_html(&nb);
    assert!(html.contains("https://cdn.jsdelivr.net/npm/starboard-notebook@0.15.2/dist/"));
}

#[test]
fn test_script_files() {
    let temp_dir = TempDir::new().unwrap();
    let nb = load("hello-world.ipynb");
    for format in [ScriptFormat::Percent, ScriptFormat::Interactive] {
        let path = temp_dir.path().join(format!("hello-{format}.py"));
        save_script_file(&nb, format, &path).unwrap();
        let parsed = load_script_file(&path, &ScriptParser::new(format)).unwrap();
        assert_eq!(parsed.len(), nb.len());
        assert_eq!(parsed.cells()[2].source_text(), "Goodbye! 👋");
    }
}

#[test]
fn test_transforms_and_outline() {
    let nb = load("hello-world.ipynb");
    assert!(markdownize(&nb).iter().all(Cell::is_markdown));
    let code_only = remove_markdown_cells(&nb);
    assert_eq!(
        outline(&code_only),
        "Jupyter Notebook v4.5\n└─▶ Code cell #b777420a (1)\n    | print(\"Hello world!\")"
    );
}
