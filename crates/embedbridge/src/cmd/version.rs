use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("embedbridge {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: embedbridge");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("EMBEDBRIDGE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("EMBEDBRIDGE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("features: session={}, cli=true", cfg!(feature = "session"));
    println!(
        "wire_types: {}",
        [
            embedbridge_frame::EMBED_READY,
            embedbridge_frame::EMBED_DATA,
            embedbridge_frame::EMBED_RESIZE,
            embedbridge_frame::EMBED_CLOSE,
            embedbridge_frame::PARENT_READY,
            embedbridge_frame::PARENT_COMMAND,
        ]
        .join(", ")
    );

    Ok(SUCCESS)
}
