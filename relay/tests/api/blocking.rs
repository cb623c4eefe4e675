use relay_socket::{
    blocking::BlockingRelaySocket,
    message::{Payload, Role},
};

use crate::helper::spawn_app;

#[actix_web::test]
async fn blocking() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let address = app.ws_address();

    // the registry runs on this test's arbiter, so block elsewhere
    actix_web::rt::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut host = BlockingRelaySocket::connect(address.clone())?;
        assert_eq!(host.role(), Role::Host);
        let guest = BlockingRelaySocket::connect(address)?;
        assert_eq!(guest.role(), Role::Guest);

        guest.send("serve")?;
        assert_eq!(host.recv(), Some(Payload::from("serve")));
        assert!(host.receive_all()?.is_empty());
        Ok(())
    })
    .await??;
    Ok(())
}
