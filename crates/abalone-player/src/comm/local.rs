//! スレッド間の通信路（同一プロセス内のワールド）

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{CommError, Communicator, Envelope, Rank, COORDINATOR};

/// 1ランク分の端点
///
/// ワールドはコーディネーターを中心とするスター型で、ワーカー同士は直接送れない。
/// コーディネーターの端点が破棄されると、ワーカーの `recv` は `Disconnected` を返す。
pub struct LocalComm {
    rank: Rank,
    size: usize,
    inbox: Receiver<Envelope>,
    /// 宛先ランクごとの送信口（届かない宛先は `None`）
    peers: Vec<Option<Sender<Envelope>>>,
}

/// `size` ランクのワールドを作る（戻り値のインデックスがランク）
pub fn local_world(size: usize) -> Vec<LocalComm> {
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();

    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| {
            let peers = (0..size)
                .map(|dest| {
                    let reachable = (rank == COORDINATOR) != (dest == COORDINATOR);
                    reachable.then(|| senders[dest].clone())
                })
                .collect();
            LocalComm { rank, size, inbox, peers }
        })
        .collect()
}

impl Communicator for LocalComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, dest: Rank, tag: i32, payload: Vec<u8>) -> Result<(), CommError> {
        let Some(Some(tx)) = self.peers.get(dest) else {
            return Err(CommError::Unreachable {
                rank: self.rank,
                dest,
                size: self.size,
            });
        };
        tx.send(Envelope { source: self.rank, tag, payload })
            .map_err(|_| CommError::Disconnected)
    }

    fn recv(&mut self) -> Result<Envelope, CommError> {
        self.inbox.recv().map_err(|_| CommError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_topology() {
        let mut world = local_world(3);
        let mut w2 = world.pop().unwrap();
        let mut w1 = world.pop().unwrap();
        let mut coord = world.pop().unwrap();
        assert_eq!((coord.rank(), w1.rank(), w2.rank()), (0, 1, 2));
        assert_eq!(w2.size(), 3);

        coord.send(2, 5, vec![1]).unwrap();
        coord.send(1, 6, vec![2]).unwrap();
        assert_eq!(w1.recv().unwrap(), Envelope { source: 0, tag: 6, payload: vec![2] });
        assert_eq!(w2.recv().unwrap(), Envelope { source: 0, tag: 5, payload: vec![1] });

        w2.send(COORDINATOR, 5, vec![9]).unwrap();
        assert_eq!(coord.recv().unwrap().source, 2);

        assert!(matches!(w1.send(2, 0, vec![]), Err(CommError::Unreachable { .. })));
        assert!(matches!(coord.send(3, 0, vec![]), Err(CommError::Unreachable { .. })));
    }

    #[test]
    fn test_workers_see_disconnect() {
        let mut world = local_world(2);
        let mut worker = world.pop().unwrap();
        drop(world);
        assert!(matches!(worker.recv(), Err(CommError::Disconnected)));
    }
}
