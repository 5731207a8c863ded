#![no_main]

use p2panda_account::Account;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must never panic, only error
    if let Ok(account) = Account::from_pickle(data) {
        // Accepted input re-encodes into a pickle that decodes to the same state
        let pickle = account.pickle();
        let account_again = Account::from_pickle(&pickle).unwrap();

        assert_eq!(account_again.identity_keys(), account.identity_keys());
        assert_eq!(account_again.one_time_keys(), account.one_time_keys());
        assert_eq!(account_again.pickle().as_slice(), pickle.as_slice());
    }
});
