use std::net::IpAddr;

use arnet_common::device::DevicePayload;

/// Prints the text to encode in a device's QR label.
pub fn payload(device_id: String, ip: IpAddr) {
    let payload = DevicePayload::new(device_id, ip);
    println!("{}", payload.to_json());
}
