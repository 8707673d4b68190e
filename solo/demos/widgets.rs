//! Walks a singleton through its whole life against the reference graph:
//! ownership, duplicate rejection, a context transition, and terminal
//! teardown. Run with `RUST_LOG=debug` to watch the arbitration decisions.

use solo::{Graph, Lifecycle, Singleton};

#[derive(Default)]
struct AudioMixer {
    volume: f32,
}

impl Singleton for AudioMixer {
    fn on_first_activation(&mut self) {
        self.volume = 0.8;
        println!("mixer up, volume {}", self.volume);
    }

    fn on_first_ready(&mut self) {
        println!("mixer ready");
    }

    fn on_final_teardown(&mut self) {
        println!("mixer down");
    }

    fn on_duplicate_detected(&mut self) {
        println!("extra mixer rejected");
    }
}

fn main() {
    env_logger::init();

    let mut graph = Graph::new();
    let mut mixer = Lifecycle::<AudioMixer, Graph<AudioMixer>>::new();

    // The first loaded context carries a mixer; it becomes the owner.
    let original = graph.spawn(AudioMixer::default());
    mixer.on_activation(&mut graph, original);
    mixer.on_ready(&mut graph, original);

    // A second context loads with its own mixer object. The owner survived
    // the transition, so the newcomer is a duplicate and gets removed.
    graph.next_context();
    let newcomer = graph.spawn(AudioMixer::default());
    mixer.on_activation(&mut graph, newcomer);
    mixer.on_ready(&mut graph, newcomer);

    // Elsewhere in the program, the accessor always lands on the owner.
    let handle = mixer.instance(&mut graph).expect("mixer is live");
    graph.get_mut(handle).expect("owner carries the mixer").volume = 0.5;
    println!("volume now {}", graph.get(handle).unwrap().volume);

    // Shutdown: the duplicate's teardown is inert, the owner's is terminal.
    mixer.on_teardown(&mut graph, newcomer);
    mixer.on_teardown(&mut graph, original);
    graph.despawn(original);

    assert!(mixer.instance(&mut graph).is_none());
    println!("mixer is gone for good");
}
