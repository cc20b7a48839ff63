//! services/api/src/bin/openapi.rs
//!
//! This binary generates the OpenAPI 3.0 document for the REST API and saves
//! it to the path given as the first argument, `openapi.json` by default.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn output_path(mut args: impl Iterator<Item = String>) -> String {
    args.nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
}

/// Generates the OpenAPI document and writes it to a file.
fn generate_spec(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = api_doc.to_pretty_json()?;
    std::fs::write(path, spec_json)?;
    println!("OpenAPI document generated at {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    generate_spec(ApiDoc::openapi(), &output_path(std::env::args()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn output_defaults_to_openapi_json() {
        assert_eq!(output_path(args(&["openapi"])), "openapi.json");
    }

    #[test]
    fn output_follows_first_argument() {
        assert_eq!(output_path(args(&["openapi", "docs/api.json"])), "docs/api.json");
    }

    #[test]
    fn written_document_lists_the_collection_routes() {
        let path = std::env::temp_dir().join(format!("slate-openapi-{}.json", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        generate_spec(ApiDoc::openapi(), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(written["paths"]["/api/collections/{collection}/query"].is_object());
        assert!(written["paths"]["/api/courses"].is_object());
    }
}
