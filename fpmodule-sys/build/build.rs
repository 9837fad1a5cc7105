use std::env;

const DEFAULT_LIB_NAME: &str = "FPModule_SDK";

fn main() {
    println!("cargo:rerun-if-env-changed=FPMODULE_LIB_DIR");
    println!("cargo:rerun-if-env-changed=FPMODULE_LIB_NAME");

    let lib_name = env::var("FPMODULE_LIB_NAME").unwrap_or_else(|_| DEFAULT_LIB_NAME.to_string());

    // The vendor ships a bare shared object without pkg-config metadata, but
    // distribution packages sometimes add one.
    if let Ok(lib_dir) = env::var("FPMODULE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", lib_dir);
        println!("cargo:rustc-link-lib=dylib={}", lib_name);
        return;
    }

    match pkg_config::Config::new()
        .print_system_libs(false)
        .probe("fpmodule")
    {
        Ok(lib) => lib.include_paths.iter().for_each(|path| {
            println!("cargo:include={}", path.display());
        }),
        Err(error) => {
            println!(
                "cargo:warning=pkg-config could not find fpmodule ({}), linking `{}` from the system search path",
                error, lib_name
            );
            println!("cargo:rustc-link-lib=dylib={}", lib_name);
        }
    }
}
