use doorhub::frame::{decode_slice, transform_in_place, PresharedKey, FRAME_SIZE};
use doorhub::validate::{Validator, ValidatorConfig};

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat, RecordOutput};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let key = PresharedKey::new(&args.key).map_err(|err| frame_error("invalid key", err))?;
    let mut bytes = read_frame(&args)?;
    if bytes.len() != FRAME_SIZE {
        return Err(CliError::new(
            DATA_INVALID,
            format!("frame is {} bytes, expected {FRAME_SIZE}", bytes.len()),
        ));
    }

    transform_in_place(&mut bytes, &key);
    let record = decode_slice(&bytes).map_err(|err| frame_error("decode failed", err))?;
    let classification = Validator::with_config(ValidatorConfig {
        expected_tag: args.tag,
    })
    .classify(&record);

    let out = RecordOutput::new(&record, classification, &bytes);
    print_record(&out, &bytes, format);
    Ok(SUCCESS)
}

fn read_frame(args: &InspectArgs) -> CliResult<Vec<u8>> {
    if let Some(path) = &args.file {
        return std::fs::read(path).map_err(|err| io_error("read failed", err));
    }
    let text = args
        .frame
        .as_deref()
        .ok_or_else(|| CliError::new(USAGE, "either a hex frame or --file is required"))?;
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(cleaned).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex: {err}")))
}
