use std::net::UdpSocket;

use doorhub::frame::{encode, seal, PresharedKey, TelemetryRecord};

use crate::cmd::SealArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::print_raw;

pub fn run(args: SealArgs) -> CliResult<i32> {
    let key = PresharedKey::new(&args.key).map_err(|err| frame_error("invalid key", err))?;
    let record = TelemetryRecord::new(args.tag, args.state, args.sensor, args.voltage);
    let frame = seal(&encode(&record), &key);

    if let Some(addr) = &args.send {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).map_err(|err| io_error("bind failed", err))?;
        socket
            .send_to(frame.as_bytes(), addr.as_str())
            .map_err(|err| io_error("send failed", err))?;
        tracing::info!(to = %addr, sensor_id = args.sensor, state = %args.state, "frame sent");
        return Ok(SUCCESS);
    }

    if args.hex {
        println!("{}", hex::encode(frame.as_bytes()));
    } else {
        print_raw(frame.as_bytes());
    }
    Ok(SUCCESS)
}
