/*++

Licensed under the Apache-2.0 license.

File Name:

    build.rs

Abstract:

    Build script for the PMP probe firmware.

--*/

fn main() {
    cfg_if::cfg_if! {
        if #[cfg(feature = "riscv")] {
            use std::env;
            use std::fs;
            use std::path::PathBuf;

            let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

            // Code runs from SPI flash. The lower half of DTIM loses write
            // access once the PMP is programmed, so data and stack live in
            // the upper half.
            fs::write(
                out_dir.join("memory.x"),
                r#"
                FLASH_ORG  = 0x40400000;
                DTIM0_ORG  = 0x80000000;
                DTIM1_ORG  = 0x80008000;

                FLASH_SIZE = 4M;
                DTIM0_SIZE = 32K;
                DTIM1_SIZE = 32K;

                MEMORY
                {
                    FLASH (rx)  : ORIGIN = FLASH_ORG, LENGTH = FLASH_SIZE
                    DTIM0 (rw)  : ORIGIN = DTIM0_ORG, LENGTH = DTIM0_SIZE
                    DTIM1 (rwx) : ORIGIN = DTIM1_ORG, LENGTH = DTIM1_SIZE
                }
                REGION_ALIAS("REGION_TEXT", FLASH);
                REGION_ALIAS("REGION_RODATA", FLASH);
                REGION_ALIAS("REGION_DATA", DTIM1);
                REGION_ALIAS("REGION_BSS", DTIM1);
                REGION_ALIAS("REGION_HEAP", DTIM1);
                REGION_ALIAS("REGION_STACK", DTIM1);"#
                    .as_bytes(),
            )
            .expect("Unable to generate memory.x");

            println!("cargo:rustc-link-search={}", out_dir.display());

            println!("cargo:rerun-if-changed=memory.x");
            println!("cargo:rustc-link-arg-bins=-Tmemory.x");

            println!("cargo:rustc-link-arg-bins=-Tlink.x");
            println!("cargo:rerun-if-changed=build.rs");
        }
    }
}
