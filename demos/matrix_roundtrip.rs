use simio::{BufferView, LocalCluster, Result, RuntimeConfig, Visibility};

fn main() -> Result<()> {
    env_logger::init();

    let mut cluster = LocalCluster::new(3, &RuntimeConfig::default())?;

    let matrix = [1i32, 2, 3, 4];
    cluster.feed(
        "x",
        &BufferView::new(&matrix[..], &[2, 2])?,
        Visibility::Secret,
    )?;

    for party in 0..cluster.world_size() {
        let share = cluster.table(party)?.get_var("x").expect("share missing");
        println!("party {party} share words = {:?}", share.words());
    }

    let out = cluster.outfeed("x")?;
    println!("reconstructed = {:?}", out.as_i32().expect("i32 buffer"));

    Ok(())
}
