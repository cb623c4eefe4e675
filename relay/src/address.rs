use std::{
    io,
    net::{IpAddr, Ipv4Addr, UdpSocket},
};

use tracing::warn;

/// Any routable address works, connecting a UDP socket sends no packets.
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Address other machines on the LAN can reach this one at, falling back to
/// loopback when there is no route out.
pub fn local_ip() -> IpAddr {
    match probe() {
        Ok(ip) => ip,
        Err(e) => {
            warn!(?e, "Could not discover LAN address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn probe() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}
