fn main() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HTTP_CONTROLLER_H")
        .generate();

    // Header generation failures are reported as warnings only.
    match bindings {
        Ok(b) => {
            b.write_to_file(format!("{crate_dir}/http_controller.h"));
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
